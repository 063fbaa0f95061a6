use std::sync::RwLock;

/// Hostname this gateway believes it runs on, as told by the master.
#[derive(Debug, Default)]
pub struct LocalHost {
    name: RwLock<String>,
}

impl LocalHost {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(initial.into()),
        }
    }

    pub fn get(&self) -> String {
        match self.name.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, host: impl Into<String>) {
        let host = host.into();
        match self.name.write() {
            Ok(mut g) => *g = host,
            Err(poisoned) => *poisoned.into_inner() = host,
        }
    }
}
