use bigdecimal::BigDecimal;
use diesel::backend::Backend;
use diesel::deserialize::{FromSql, Result as DeserializeResult};
use diesel::serialize::{Output, Result as SerializeResult, ToSql};
use diesel::sql_types::Text;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Write;
use std::str::FromStr;

/// Arbitrary-precision decimal stored as TEXT. SQLite has no decimal type
/// and REAL would corrupt prices, so comparisons on this column happen in
/// Rust rather than in SQL.
#[derive(Debug, Clone, AsExpression, FromSqlRow, Default, PartialEq, PartialOrd, Eq, Ord)]
#[sql_type = "Text"]
pub struct BigDecimalField(pub BigDecimal);

impl From<BigDecimalField> for BigDecimal {
    fn from(x: BigDecimalField) -> Self {
        x.0
    }
}

impl From<BigDecimal> for BigDecimalField {
    fn from(x: BigDecimal) -> Self {
        Self(x)
    }
}

impl Display for BigDecimalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl<DB> ToSql<Text, DB> for BigDecimalField
where
    DB: Backend,
    String: ToSql<Text, DB>,
{
    fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> SerializeResult {
        let s = self.0.to_string();
        s.to_sql(out)
    }
}

impl<DB> FromSql<Text, DB> for BigDecimalField
where
    DB: Backend,
    String: FromSql<Text, DB>,
{
    fn from_sql(bytes: Option<&DB::RawValue>) -> DeserializeResult<Self> {
        let s = String::from_sql(bytes)?;
        match BigDecimal::from_str(&s) {
            Ok(x) => Ok(BigDecimalField(x)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_field_orders_numerically() {
        // Text ordering would put "12.5" before "7.25".
        let small: BigDecimalField = BigDecimal::from_str("7.25").unwrap().into();
        let big: BigDecimalField = BigDecimal::from_str("12.5").unwrap().into();
        assert!(small < big);
    }

    #[test]
    fn decimal_field_round_trips_through_display() {
        let field: BigDecimalField = BigDecimal::from_str("1250.00").unwrap().into();
        assert_eq!(
            BigDecimal::from_str(&field.to_string()).unwrap(),
            field.into()
        );
    }
}
