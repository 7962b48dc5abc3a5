//! Component registration
//!
//! Every pluggable component is one of three roles. The role is fixed by the
//! [`Module`] variant, so routing into the right registry happens once, when
//! the component is registered.

use crate::middleware::{
    HeadersMiddleware, LoggingMiddleware, Middleware, MiddlewareChain, ProxyMiddleware,
    ProxyRotationMiddleware, ProxyServiceMiddleware, RenderMiddleware,
    UserAgentRotationMiddleware,
};
use crate::output::{
    Handler, JsonFileHandler, LogReporter, MarkdownReporter, MetadataHandler, Reporter,
    S3Handler, SlackReporter, SqliteHandler,
};

/// A registrable component
pub enum Module {
    Middleware(Box<dyn Middleware>),
    Handler(Box<dyn Handler>),
    Reporter(Box<dyn Reporter>),
}

impl Module {
    pub fn middleware(middleware: impl Middleware + 'static) -> Self {
        Module::Middleware(Box::new(middleware))
    }

    pub fn handler(handler: impl Handler + 'static) -> Self {
        Module::Handler(Box::new(handler))
    }

    pub fn reporter(reporter: impl Reporter + 'static) -> Self {
        Module::Reporter(Box::new(reporter))
    }

    /// Display name of the wrapped component
    pub fn name(&self) -> &'static str {
        match self {
            Module::Middleware(m) => m.name(),
            Module::Handler(h) => h.name(),
            Module::Reporter(r) => r.name(),
        }
    }
}

macro_rules! impl_into_module {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Module {
                fn from(component: $ty) -> Self {
                    Module::$variant(Box::new(component))
                }
            }
        )+
    };
}

impl_into_module!(Middleware:
    HeadersMiddleware,
    LoggingMiddleware,
    ProxyMiddleware,
    ProxyRotationMiddleware,
    ProxyServiceMiddleware,
    RenderMiddleware,
    UserAgentRotationMiddleware,
);

impl_into_module!(Handler: JsonFileHandler, MetadataHandler, S3Handler, SqliteHandler);

impl_into_module!(Reporter: LogReporter, MarkdownReporter, SlackReporter);

/// The three typed registries of a crawler
#[derive(Default)]
pub struct Registry {
    pub(crate) middlewares: MiddlewareChain,
    pub(crate) handlers: Vec<Box<dyn Handler>>,
    pub(crate) reporters: Vec<Box<dyn Reporter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes a module into its registry, keeping registration order
    pub fn register(&mut self, module: Module) {
        match module {
            Module::Middleware(m) => self.middlewares.push(m),
            Module::Handler(h) => self.handlers.push(h),
            Module::Reporter(r) => self.reporters.push(r),
        }
    }

    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middlewares.names()
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn reporter_names(&self) -> Vec<&'static str> {
        self.reporters.iter().map(|r| r.name()).collect()
    }
}
