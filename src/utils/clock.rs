use std::sync::Mutex;

/// Source of the current local calendar day (`YYYY-MM-DD`)
pub trait Clock: Send + Sync {
    fn today(&self) -> String;
}

/// Wall clock in the local time zone; midnight is the rollover boundary
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Manually advanced clock
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<String>,
}

impl FixedClock {
    pub fn new(day: &str) -> Self {
        Self {
            day: Mutex::new(day.to_string()),
        }
    }

    pub fn set(&self, day: &str) {
        if let Ok(mut current) = self.day.lock() {
            *current = day.to_string();
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.day.lock().map(|d| d.clone()).unwrap_or_default()
    }
}
