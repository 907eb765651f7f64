#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct RunStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples CPU and memory of this process between pipeline phases.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory_mb: Mutex<u64>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
            start_time: Instant::now(),
            peak_memory_mb: Mutex::new(0),
            enabled,
        }
    }

    pub fn sample(&self) -> Option<RunStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(RunStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(not(feature = "cli"))]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_phase(&self, _phase: &str) {}

    pub fn log_final(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_samples_nothing() {
        let monitor = RunMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample().is_none());
    }
}
