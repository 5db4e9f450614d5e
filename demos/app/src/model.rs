use std::sync::Arc;

use kiln::{inject, instance, Lazy, Result};

#[instance]
pub struct UserData;

impl UserData {
    pub fn name(&self) -> &str {
        "guest"
    }
}

pub struct Settings {
    pub greeting: String,
}

impl Settings {
    #[instance]
    pub fn load() -> Arc<Self> {
        Arc::new(Settings {
            greeting: "hello".to_string(),
        })
    }
}

pub trait HomeRepository {
    fn greeting(&self) -> String;
}

#[instance(type = dyn HomeRepository, classifier = "main")]
pub struct MemoryRepository {
    settings: Arc<Settings>,
}

impl MemoryRepository {
    #[inject]
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl HomeRepository for MemoryRepository {
    fn greeting(&self) -> String {
        self.settings.greeting.clone()
    }
}

/// Reads the settings only once rendered.
#[instance]
pub struct Footer {
    settings: Lazy<Settings>,
}

impl Footer {
    #[inject]
    pub fn new(settings: Lazy<Settings>) -> Self {
        Self { settings }
    }

    pub fn is_loaded(&self) -> bool {
        self.settings.is_resolved()
    }

    pub fn text(&self) -> Result<String> {
        Ok(format!("{} from the footer", self.settings.get()?.greeting))
    }
}

pub struct Clock {
    pub started: u64,
}

#[instance(scoping = direct)]
pub fn provide_clock() -> Clock {
    Clock { started: 7 }
}

kiln::include_factories!("model");
