use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use kiln::{inject, instance, CustomFactory, Instantiate, Scope, Scoping};
use log::debug;

use crate::model::{Clock, HomeRepository, UserData};

pub trait Page {
    fn title(&self) -> String;
}

pub trait Titled {
    fn heading(&self) -> &'static str;
}

#[instance(type = dyn Page, scoping = unscoped)]
pub struct HomePage {
    repository: Arc<dyn HomeRepository>,
    user: Option<Arc<UserData>>,
    clock: Arc<Clock>,
}

impl HomePage {
    #[inject]
    pub fn new(
        #[classifier("main")] repository: Arc<dyn HomeRepository>,
        user: Option<Arc<UserData>>,
        clock: Arc<Clock>,
    ) -> Self {
        Self {
            repository,
            user,
            clock,
        }
    }
}

impl Page for HomePage {
    fn title(&self) -> String {
        let user = self.user.as_ref().map(|user| user.name()).unwrap_or("stranger");
        format!("{} {} @{}", self.repository.greeting(), user, self.clock.started)
    }
}

#[instance(types(dyn Page, dyn Titled), scoping = direct, classifier = "about")]
pub struct AboutPage;

impl Page for AboutPage {
    fn title(&self) -> String {
        "about".to_string()
    }
}

impl Titled for AboutPage {
    fn heading(&self) -> &'static str {
        "About us"
    }
}

/// Counts the instances it was asked for.
pub struct Counted;

pub static COUNTED: AtomicUsize = AtomicUsize::new(0);

impl<T: ?Sized> CustomFactory<T> for Counted {
    fn create(
        scope: &dyn Scope,
        scoping: Scoping,
        classifier: &str,
        instantiate: Instantiate<T>,
    ) -> kiln::Result<Arc<T>> {
        COUNTED.fetch_add(1, Ordering::SeqCst);
        debug!("counted instance `{classifier}` ({scoping:?})");
        instantiate(scope)
    }
}

#[instance(type = dyn Page, factory = Counted, classifier = "counted")]
pub struct CountedPage {
    signed_in: bool,
}

impl CountedPage {
    pub fn new(scope: &dyn Scope) -> Self {
        let signed_in = matches!(scope.get_optional::<UserData>(""), Ok(Some(_)));
        Self { signed_in }
    }
}

impl Page for CountedPage {
    fn title(&self) -> String {
        if self.signed_in {
            "welcome back".to_string()
        } else {
            "welcome".to_string()
        }
    }
}

#[instance(type = dyn Page, disabled)]
pub struct DraftPage;

impl Page for DraftPage {
    fn title(&self) -> String {
        "draft".to_string()
    }
}

kiln::include_factories!("pages");
