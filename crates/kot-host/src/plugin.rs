use kot_core::KotError;
use kot_engine::Registry;

/// A bundle of facts, fixtures and checks registered together.
pub trait Plugin {
    /// Identity used for de-duplication and as the registration origin.
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn register(&self, registry: &mut Registry) -> Result<(), KotError>;
}

type RegisterFn = Box<dyn Fn(&mut Registry) -> Result<(), KotError>>;

/// Plugin backed by a closure.
pub struct FnPlugin {
    name: String,
    description: Option<String>,
    register: RegisterFn,
}

impl FnPlugin {
    pub fn new<F>(name: impl Into<String>, register: F) -> Self
    where
        F: Fn(&mut Registry) -> Result<(), KotError> + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            register: Box::new(register),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn register(&self, registry: &mut Registry) -> Result<(), KotError> {
        (self.register)(registry)
    }
}
