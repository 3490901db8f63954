use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use log::info;

/// Collects the durations of named phases, and prints them on request.
#[derive(Default)]
pub struct Timing {
    results: Rc<RefCell<Vec<(String, f32)>>>,
}

/// A running measurement, which is recorded in its [Timing] when finished.
pub struct Timer {
    name: String,
    start: Instant,
    results: Rc<RefCell<Vec<(String, f32)>>>,
    registered: bool,
}

impl Timing {
    pub fn new() -> Timing {
        Timing::default()
    }

    /// Starts a new measurement with the given name.
    pub fn start(&mut self, name: &str) -> Timer {
        Timer {
            name: name.to_string(),
            start: Instant::now(),
            results: self.results.clone(),
            registered: false,
        }
    }

    /// Returns the finished measurements in the order that they were finished.
    pub fn results(&self) -> Vec<(String, f32)> {
        self.results.borrow().clone()
    }

    /// Prints all the finished measurements to stderr.
    pub fn print(&self) {
        for (name, time) in self.results.borrow().iter() {
            eprintln!("Time {}: {:.3}s", name, time);
        }
    }
}

impl Timer {
    /// Finishes the measurement. Finishing twice has no effect.
    pub fn finish(&mut self) {
        if self.registered {
            return;
        }

        let time = self.start.elapsed().as_secs_f64() as f32;
        info!("Time {}: {:.3}s", self.name, time);

        self.results.borrow_mut().push((self.name.clone(), time));
        self.registered = true;
    }
}
