use tokio::task::JoinHandle;
use std::collections::HashMap;
use crate::error::{Error, Result};
use tracing::{error, info};

/// Tracks named background tasks (e.g. the payout reconciliation poll) and
/// reports tasks that terminated unexpectedly.
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a background task and register it for monitoring
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        self.tasks.insert(name, handle);
        self
    }

    /// Returns an error if any registered task has terminated unexpectedly
    pub fn check_health(&mut self) -> Result<()> {
        let failed_tasks: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if !failed_tasks.is_empty() {
            for name in &failed_tasks {
                self.tasks.remove(name);
            }
            let message = format!("Tasks terminated unexpectedly: {:?}", failed_tasks);
            error!("{}", message);
            return Err(Error::ConfigError(message));
        }

        Ok(())
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort all registered tasks
    pub fn shutdown_all(&mut self) {
        info!("Shutting down {} background tasks", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            info!("Aborted task: {}", name);
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
