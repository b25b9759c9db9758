use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid user type: {0}")]
pub struct ParseRoleError(String);

/// Side of the marketplace an account belongs to. Stored as lowercase text
/// both in the database and on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Farmer,
    Marketer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Farmer => "farmer",
            UserRole::Marketer => "marketer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "farmer" => Ok(UserRole::Farmer),
            "marketer" => Ok(UserRole::Marketer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[cfg(feature = "with-diesel")]
#[allow(dead_code)]
mod sql {
    use super::UserRole;
    use diesel::backend::Backend;
    use diesel::deserialize::FromSql;
    use diesel::expression::bound::Bound;
    use diesel::expression::AsExpression;
    use diesel::serialize::{Output, ToSql};
    use diesel::sql_types::Text;
    use diesel::*;

    impl AsExpression<Text> for UserRole {
        type Expression = Bound<Text, String>;

        fn as_expression(self) -> Self::Expression {
            Bound::new(self.to_string())
        }
    }

    impl AsExpression<Text> for &UserRole {
        type Expression = Bound<Text, String>;

        fn as_expression(self) -> Self::Expression {
            Bound::new(self.to_string())
        }
    }

    impl<DB> FromSql<Text, DB> for UserRole
    where
        DB: Backend,
        String: FromSql<Text, DB>,
    {
        fn from_sql(bytes: Option<&<DB as Backend>::RawValue>) -> deserialize::Result<Self> {
            let s: String = FromSql::from_sql(bytes)?;
            Ok(s.parse()?)
        }
    }

    impl<DB> ToSql<Text, DB> for UserRole
    where
        DB: Backend,
        str: ToSql<Text, DB>,
    {
        fn to_sql<W: std::io::Write>(&self, out: &mut Output<'_, W, DB>) -> serialize::Result {
            self.as_str().to_sql(out)
        }
    }

    #[derive(FromSqlRow)]
    #[diesel(foreign_derive)]
    struct UserRoleProxy(UserRole);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_roles() {
        assert_eq!("farmer".parse::<UserRole>().unwrap(), UserRole::Farmer);
        assert_eq!("Marketer".parse::<UserRole>().unwrap(), UserRole::Marketer);
    }

    #[test]
    fn parse_unknown_role() {
        assert_eq!(
            "broker".parse::<UserRole>().unwrap_err().to_string(),
            "invalid user type: broker".to_string()
        );
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Farmer).unwrap(),
            "\"farmer\""
        );
        assert_eq!(
            serde_json::from_str::<UserRole>("\"marketer\"").unwrap(),
            UserRole::Marketer
        );
    }
}
