use crate::error::{Result, RetroplanError};
use crate::types::{Building, Fitness};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Building energy simulator seam.
///
/// `choices` is the 4-gene block (wall, ceiling, floor, window) of one building.
/// Returns (heating demand, discomfort index, cost) for that building.
pub trait Simulator: Send + Sync {
    fn simulate(&self, building: &Building, choices: &[u32]) -> Result<Fitness>;

    /// Simulate under a deadline the simulator enforces itself, stopping any work it started.
    /// `None` means it cannot, and the caller abandons the call on a helper thread instead.
    fn simulate_until(&self, _building: &Building, _choices: &[u32], _limit: Duration) -> Option<Result<Fitness>> {
        None
    }
}

/// Runs an external program once per building:
/// `<program> <args..> <building> <wall> <ceiling> <floor> <window>`.
///
/// The last non-empty stdout line must hold three numbers separated by
/// whitespace or commas.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    program: String,
    args: Vec<String>,
}

impl CommandSimulator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line, program first
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| {
            RetroplanError::Configuration("simulator command is empty".to_string())
        })?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl CommandSimulator {
    fn command(&self, building: &Building, choices: &[u32]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&building.name)
            .args(choices.iter().map(|c| c.to_string()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // a timeout kills the whole group
            command.process_group(0);
        }
        command
    }

    fn run(&self, building: &Building, choices: &[u32], limit: Option<Duration>) -> Result<Fitness> {
        let failure = |message: String| RetroplanError::Simulator {
            building: building.name.clone(),
            message,
        };

        let mut child = self
            .command(building, choices)
            .spawn()
            .map_err(|e| failure(format!("failed to launch {}: {}", self.program, e)))?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_until(&mut child, limit.map(|l| Instant::now() + l)) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                let _ = stdout.join();
                let _ = stderr.join();
                return Err(RetroplanError::SimulatorTimeout {
                    building: building.name.clone(),
                    seconds: limit.map_or(0.0, |l| l.as_secs_f64()),
                });
            }
            Err(e) => {
                terminate(&mut child);
                return Err(failure(format!("failed to wait on {}: {}", self.program, e)));
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(failure(format!(
                "exited with {}: {}",
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        parse_performance(&stdout).ok_or_else(|| failure(format!("unparseable output: {:?}", stdout.trim())))
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&self, building: &Building, choices: &[u32]) -> Result<Fitness> {
        self.run(building, choices, None)
    }

    fn simulate_until(&self, building: &Building, choices: &[u32], limit: Duration) -> Option<Result<Fitness>> {
        Some(self.run(building, choices, Some(limit)))
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

/// Poll until the child exits; `Ok(None)` once `deadline` passes
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Kill the child together with its process group and reap it
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: signals the process group led by our own, not yet reaped, child
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Parse "heating comfort price" from the last non-empty line
pub fn parse_performance(stdout: &str) -> Option<Fitness> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    let values: Vec<f64> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        [heating, comfort, price] => Some(Fitness::new(*heating, *comfort, *price)),
        _ => None,
    }
}

/// Run one simulator call, giving up after `timeout`.
///
/// Simulators that enforce their own deadline are trusted to clean up. Any other
/// call keeps running on its own thread after a timeout and its result is discarded.
pub fn simulate_with_timeout(
    simulator: &Arc<dyn Simulator>,
    building: &Building,
    choices: &[u32],
    timeout: Option<Duration>,
) -> Result<Fitness> {
    let Some(limit) = timeout else {
        return simulator.simulate(building, choices);
    };
    if let Some(result) = simulator.simulate_until(building, choices, limit) {
        return result;
    }

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(simulator);
    let target = building.clone();
    let genes = choices.to_vec();
    thread::spawn(move || {
        let _ = tx.send(worker.simulate(&target, &genes));
    });

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(RetroplanError::SimulatorTimeout {
            building: building.name.clone(),
            seconds: limit.as_secs_f64(),
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(RetroplanError::Simulator {
            building: building.name.clone(),
            message: "simulator thread panicked".to_string(),
        }),
    }
}
