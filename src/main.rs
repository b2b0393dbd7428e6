use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use rawvid::{
    DecodedFrame, FrameNum, FrameRate, RawVideo, VideoInfo, VideoPlayer, VideoSpec,
    playback::{Playback, Seek},
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

pub const APP_TITLE_AND_VERSION: &str =
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Plays and trims headerless raw video files.
///
/// Files ending in `.yuv` are read as planar YUV 4:2:0, anything else as
/// packed RGB24. While playing, commands are read from stdin: `p` (or a
/// lone space) play/pause, `n` next, `b` previous, `g <n>` go to,
/// `[ <n>` / `] <n>` selection marks, `c` crop to selection, `s <png>`
/// snapshot, `q` quit.
#[derive(Parser, Debug)]
#[command(version, about, disable_help_flag = true)]
struct Args {
    /// Raw video file.
    #[arg(required_unless_present = "spec")]
    file: Option<PathBuf>,

    /// Video width in pixels.
    #[arg(short, long, default_value_t = 640)]
    width: u32,

    /// Video height in pixels.
    #[arg(short = 'h', long, default_value_t = 480)]
    height: u32,

    /// Frame rate, e.g. `30`, `29.97` or `30000/1001`.
    #[arg(short, long, alias = "frameRate", default_value_t = FrameRate::DEFAULT)]
    frame_rate: FrameRate,

    /// JSON file with `path`, `width`, `height` and optional `frameRate`.
    #[arg(long, conflicts_with = "file")]
    spec: Option<PathBuf>,

    /// Keep only frames START..=END (1-based), then exit.
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    crop: Option<Vec<u64>>,

    /// Write frame FRAME as a PNG to `--output`, then exit.
    #[arg(long, value_name = "FRAME", requires = "output")]
    snapshot: Option<i64>,

    /// Destination of `--snapshot`.
    #[arg(short, long, value_name = "PNG")]
    output: Option<PathBuf>,

    /// Start paused instead of playing.
    #[arg(long)]
    paused: bool,

    /// Print help.
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn video_spec(&self) -> anyhow::Result<VideoSpec> {
        match (&self.spec, &self.file) {
            (Some(spec), _) => VideoSpec::from_json_file(spec),
            (None, Some(file)) => {
                Ok(VideoSpec::new(file, self.width, self.height).with_frame_rate(self.frame_rate))
            }
            (None, None) => bail!("no video file given"),
        }
    }

    fn is_batch(&self) -> bool {
        self.crop.is_some() || self.snapshot.is_some()
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Seek(Seek),
    TogglePlay,
    MarkStart(u64),
    MarkEnd(u64),
    CropSelection,
    Snapshot(PathBuf),
    Quit,
    InputClosed,
    Decoded(rawvid::Result<Option<DecodedFrame>>),
    Cropped(rawvid::Result<VideoInfo>),
}

impl AppEvent {
    fn parse_command(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            // A line holding only the space bar toggles, a bare enter does nothing.
            return Ok(line.contains(' ').then_some(Self::TogglePlay));
        };
        let number = |word: Option<&str>| {
            word.and_then(|word| word.parse::<i64>().ok())
                .ok_or_else(|| format!("\"{command}\" needs a frame number"))
        };

        let event = match command {
            "p" | "space" | "play" | "pause" => Self::TogglePlay,
            "n" | "." | "next" => Self::Seek(Seek::Next),
            "b" | "," | "prev" => Self::Seek(Seek::Prev),
            "first" | "home" => Self::Seek(Seek::First),
            "last" | "end" => Self::Seek(Seek::Last),
            "g" | "goto" => Self::Seek(Seek::To(number(words.next())?)),
            "[" => Self::MarkStart(number(words.next())?.max(0) as u64),
            "]" => Self::MarkEnd(number(words.next())?.max(0) as u64),
            "c" | "crop" => Self::CropSelection,
            "s" | "snapshot" => match words.next() {
                Some(path) => Self::Snapshot(PathBuf::from(path)),
                None => return Err("\"s\" needs an output path".to_owned()),
            },
            "q" | "quit" | "esc" => Self::Quit,
            other => return Err(format!("unknown command \"{other}\"")),
        };
        Ok(Some(event))
    }
}

struct MainApp {
    player: Arc<VideoPlayer>,
    playback: Playback,
    frame_interval: Duration,
    current: FrameNum,
    shown: Option<DecodedFrame>,
    input_closed: bool,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl MainApp {
    pub fn new(spec: VideoSpec, paused: bool) -> anyhow::Result<Self> {
        info!("starting up!");
        info!(
            "{}x{} at {:.3} fps",
            spec.width,
            spec.height,
            spec.frame_rate.fps()
        );
        let frame_interval = spec.frame_rate.frame_interval();
        let player = Arc::new(VideoPlayer::new());
        let (info, first) = player
            .open(spec)
            .context("failed to open raw video")?;

        let mut playback = Playback::new(info.layout.total_frames);
        if !paused {
            playback.play();
        }

        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        Ok(Self {
            player,
            playback,
            frame_interval,
            current: info.current_frame,
            shown: first,
            input_closed: false,
            event_sender,
            event_receiver,
        })
    }

    fn spawn_command_reader(&self) {
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match AppEvent::parse_command(&line) {
                    Ok(Some(event)) => {
                        if sender.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => warn!("{msg}"),
                }
            }
            let _ = sender.send(AppEvent::InputClosed);
        });
    }

    pub async fn run_loop(&mut self) {
        self.spawn_command_reader();

        let mut ticker = time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if self.input_closed && !self.playback.is_playing() {
                break;
            }

            tokio::select! {
                _ = ticker.tick(), if self.playback.is_playing() => self.request_frame(Seek::Next),
                event = self.event_receiver.recv() => match event {
                    Some(AppEvent::Quit) | None => break,
                    Some(event) => self.handle_event(event),
                },
            }
        }

        self.playback.stop();
        self.player.close();
        info!("bye!");
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Seek(seek) => self.request_frame(seek),
            AppEvent::TogglePlay => {
                self.playback.toggle();
                info!("{}", self.playback.state());
            }
            AppEvent::MarkStart(frame) => {
                self.playback.set_selection_start(frame);
                self.log_selection();
                self.request_frame(Seek::First);
            }
            AppEvent::MarkEnd(frame) => {
                self.playback.set_selection_end(frame);
                self.log_selection();
                self.request_frame(Seek::Last);
            }
            AppEvent::CropSelection => self.crop_selection(),
            AppEvent::Snapshot(path) => self.snapshot(path),
            AppEvent::Decoded(Ok(Some(frame))) => self.show(frame),
            AppEvent::Decoded(Ok(None)) => {}
            AppEvent::Decoded(Err(err)) => error!("failed to decode frame: {err}"),
            AppEvent::Cropped(Ok(info)) => {
                info!("video now has {} frames", info.layout.total_frames);
                self.playback.reset(info.layout.total_frames);
                self.request_frame(Seek::To(1));
            }
            AppEvent::Cropped(Err(err)) => error!("crop failed: {err}"),
            AppEvent::InputClosed => self.input_closed = true,
            AppEvent::Quit => {}
        }
    }

    /// Decodes on the blocking pool; the player drops the request if a
    /// previous decode is still running.
    fn request_frame(&self, seek: Seek) {
        let target = self.playback.target(seek, self.current);
        let player = Arc::clone(&self.player);
        let sender = self.event_sender.clone();
        tokio::task::spawn_blocking(move || {
            let _ = sender.send(AppEvent::Decoded(player.try_decode(target)));
        });
    }

    fn show(&mut self, frame: DecodedFrame) {
        self.current = frame.index;
        self.playback.frame_shown(frame.index);
        info!(
            "frame {}/{}{}",
            frame.index,
            self.playback.total_frames(),
            if self.playback.is_playing() { "" } else { " (paused)" }
        );
        self.shown = Some(frame);
    }

    fn crop_selection(&mut self) {
        let selection = self.playback.selection();
        self.playback.pause();

        let player = Arc::clone(&self.player);
        let sender = self.event_sender.clone();
        tokio::task::spawn_blocking(move || {
            let result = player.crop(selection.first().0, selection.last().0);
            let _ = sender.send(AppEvent::Cropped(result));
        });
    }

    fn snapshot(&self, path: PathBuf) {
        let Some(frame) = &self.shown else {
            warn!("nothing shown yet");
            return;
        };
        match frame.image.save_png(&path) {
            Ok(()) => info!("saved frame {} to \"{}\"", frame.index, path.display()),
            Err(err) => error!("failed to save \"{}\": {err}", path.display()),
        }
    }

    fn log_selection(&self) {
        let selection = self.playback.selection();
        info!("selection {}..={}", selection.first(), selection.last());
    }
}

fn run_batch(args: &Args, spec: VideoSpec) -> anyhow::Result<()> {
    let path = spec.path.clone();
    let mut video = RawVideo::open(spec)
        .with_context(|| format!("failed to open \"{}\"", path.display()))?;

    if let Some(range) = &args.crop {
        let &[start, end] = range.as_slice() else {
            bail!("--crop takes exactly START and END");
        };
        video
            .crop(start, end)
            .with_context(|| format!("failed to crop \"{}\"", path.display()))?;
    }

    if let (Some(frame), Some(output)) = (args.snapshot, &args.output) {
        let decoded = video.decode(frame).context("failed to decode frame")?;
        decoded
            .image
            .save_png(output)
            .with_context(|| format!("failed to write \"{}\"", output.display()))?;
        info!("saved frame {} to \"{}\"", decoded.index, output.display());
    }

    video.close();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("{APP_TITLE_AND_VERSION}");

    let spec = args.video_spec()?;
    if args.is_batch() {
        return run_batch(&args, spec);
    }

    MainApp::new(spec, args.paused)?.run_loop().await;
    Ok(())
}
