#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use poker_seat::config::SeatConfig;
use poker_seat::exec::{CommandOutput, CommandRunner};
use poker_seat::game::Seat;
use poker_seat::{PlayerSetup, SessionStore, ToolBox};
use tempfile::TempDir;

/// Stand-in for v4l2-ctl, ffmpeg and espeak. Records every invocation.
#[derive(Clone, Default)]
pub struct FakeRig {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    pub camera_formats: Option<&'static str>,
    pub capture_fails: bool,
    pub speech_fails: bool,
}

impl FakeRig {
    pub fn working() -> Self {
        Self {
            camera_formats: Some("[0]: 'MJPG' (Motion-JPEG, compressed)"),
            ..Self::default()
        }
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call[0].clone()).collect()
    }
}

impl CommandRunner for FakeRig {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend_from_slice(args);
        self.calls.lock().push(call);

        match program {
            "v4l2-ctl" => match self.camera_formats {
                Some(formats) => Ok(CommandOutput::ok(formats)),
                None => Ok(CommandOutput::failed(1, "Cannot open device")),
            },
            "ffmpeg" if self.capture_fails => Ok(CommandOutput::failed(1, "Device busy")),
            "ffmpeg" => {
                let path = args.last().expect("output path");
                fs::write(path, b"\xFF\xD8\xFF\xE0 fake jpeg")?;
                Ok(CommandOutput::ok(""))
            }
            "espeak" if self.speech_fails => Ok(CommandOutput::failed(1, "no audio device")),
            "espeak" => Ok(CommandOutput::ok("")),
            other => Err(io::Error::new(io::ErrorKind::NotFound, other.to_string())),
        }
    }
}

pub fn config_in(dir: &Path) -> SeatConfig {
    let mut config = SeatConfig::default();
    config.capture.devices = vec!["/dev/video0".to_string(), "/dev/video1".to_string()];
    config.capture.image_path = dir.join("poker_hand.jpg");
    config.odds.mc_samples = 400;
    config.seed = Some(17);
    config
}

pub fn toolbox_with(rig: FakeRig) -> (TempDir, ToolBox) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::open(dir.path().join("data")).expect("store opens");
    let toolbox = ToolBox::from_config(store, &config_in(dir.path()), Arc::new(rig));
    (dir, toolbox)
}

pub fn three_handed() -> Vec<PlayerSetup> {
    vec![
        PlayerSetup::new("Bob", 500, Seat::Button),
        PlayerSetup::new("Mike", 300, Seat::SmallBlind),
        PlayerSetup::new("Claude", 400, Seat::BigBlind),
    ]
}
