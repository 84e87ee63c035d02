//! One running capture per interface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{PacketCapture, RawFrame};
use crate::error::CaptureError;

/// Interval at which a bounded join checks for thread completion.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A capture running on its own thread.
///
/// Frames are handed to the callback in arrival order. Stopping is
/// cooperative: `stop` clears the running flag and the capture iterator
/// ends at its next read timeout.
pub struct CaptureSession {
    interface: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureSession {
    /// Open `capture` and start delivering frames to `on_frame`.
    ///
    /// Returns once the capture channel is open, so a failure to open it
    /// is reported here rather than on the capture thread. `on_exit` runs
    /// on the capture thread after the last frame.
    pub fn start<C, F, E>(mut capture: C, mut on_frame: F, on_exit: E) -> Result<Self, CaptureError>
    where
        C: PacketCapture + 'static,
        F: FnMut(&str, &RawFrame) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        capture.set_running(Arc::clone(&running));
        let interface = capture.interface_name().to_string();

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_interface = interface.clone();

        let handle = thread::Builder::new()
            .name(format!("capture-{interface}"))
            .spawn(move || {
                let frames = match capture.capture_dhcp_frames() {
                    Ok(frames) => {
                        let _ = ready_tx.send(Ok(()));
                        frames
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for frame in frames {
                    on_frame(&thread_interface, &frame);
                }

                debug!("Capture on {} finished", thread_interface);
                on_exit();
            })
            .map_err(|e| CaptureError::ChannelCreation(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                interface,
                running,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CaptureError::ChannelCreation(
                    "capture thread exited during startup".to_string(),
                ))
            }
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Ask the capture to stop. Does not wait.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// True while the capture thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Wait up to `timeout` for the capture thread to finish.
    ///
    /// Returns `false` if it is still running when the timeout expires;
    /// the session can be joined again later.
    pub fn join(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        if handle.join().is_err() {
            warn!("Capture thread for {} panicked", self.interface);
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Capture that replays a fixed list of frames, then optionally idles
    /// until stopped.
    pub(crate) struct ScriptedCapture {
        pub name: String,
        pub frames: Vec<Vec<u8>>,
        pub idle_until_stopped: bool,
        pub fail_with: Option<CaptureError>,
        pub running: Arc<AtomicBool>,
    }

    impl ScriptedCapture {
        pub(crate) fn new(name: &str, frames: Vec<Vec<u8>>) -> Self {
            Self {
                name: name.to_string(),
                frames,
                idle_until_stopped: false,
                fail_with: None,
                running: Arc::new(AtomicBool::new(true)),
            }
        }

        pub(crate) fn idle(mut self) -> Self {
            self.idle_until_stopped = true;
            self
        }

        pub(crate) fn failing(mut self, error: CaptureError) -> Self {
            self.fail_with = Some(error);
            self
        }
    }

    impl PacketCapture for ScriptedCapture {
        fn capture_dhcp_frames(
            &mut self,
        ) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError> {
            if let Some(e) = self.fail_with.take() {
                return Err(e);
            }

            let running = Arc::clone(&self.running);
            let idle = self.idle_until_stopped;
            let replay = std::mem::take(&mut self.frames)
                .into_iter()
                .map(|data| RawFrame { data });
            let tail = std::iter::from_fn(move || {
                while idle && running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(5));
                }
                None
            });

            Ok(Box::new(replay.chain(tail)))
        }

        fn interface_name(&self) -> &str {
            &self.name
        }

        fn set_running(&mut self, running: Arc<AtomicBool>) {
            self.running = running;
        }
    }

    #[test]
    fn delivers_frames_in_order_with_interface() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let capture = ScriptedCapture::new("br0", vec![vec![1], vec![2], vec![3]]);

        let mut session = CaptureSession::start(
            capture,
            move |iface, frame| sink.lock().unwrap().push((iface.to_string(), frame.data[0])),
            || {},
        )
        .unwrap();

        assert!(session.join(Duration::from_secs(2)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("br0".to_string(), 1),
                ("br0".to_string(), 2),
                ("br0".to_string(), 3)
            ]
        );
    }

    #[test]
    fn start_failure_is_reported_to_caller() {
        let capture = ScriptedCapture::new("wlan0", vec![])
            .failing(CaptureError::InterfaceNotFound("wlan0".to_string()));

        let result = CaptureSession::start(capture, |_, _| {}, || {});

        assert!(matches!(result, Err(CaptureError::InterfaceNotFound(_))));
    }

    #[test]
    fn stop_ends_an_idle_session() {
        let exited = Arc::new(AtomicBool::new(false));
        let exited_flag = Arc::clone(&exited);
        let capture = ScriptedCapture::new("br0", vec![]).idle();

        let mut session = CaptureSession::start(
            capture,
            |_, _| {},
            move || exited_flag.store(true, Ordering::SeqCst),
        )
        .unwrap();

        assert!(session.is_running());
        assert!(!session.join(Duration::from_millis(30)));

        session.stop();
        assert!(session.join(Duration::from_secs(2)));
        assert!(!session.is_running());
        assert!(exited.load(Ordering::SeqCst));
    }

    #[test]
    fn join_after_completion_is_immediate() {
        let mut session =
            CaptureSession::start(ScriptedCapture::new("br0", vec![]), |_, _| {}, || {}).unwrap();

        assert!(session.join(Duration::from_secs(2)));
        assert!(session.join(Duration::ZERO));
    }
}
