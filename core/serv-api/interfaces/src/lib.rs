/// Descriptor of a farmgate service. Binds the service to its
/// command line interface at wiring time.
pub trait Service {
    /// Command line interface of the service, `()` if it has none.
    type Cli;
}

/// Dependency provider for service constructors. The wiring context
/// implements this once per (service, component) pair.
pub trait Provider<T: Service + ?Sized, Component> {
    fn component(&self) -> Component;
}
