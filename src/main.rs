use clap::{value_parser, Arg, Command};
use coach_lib::core::coach::{FrameResult, PipelineError, PipelineObserver};
use coach_lib::core::config::{CoachConfig, FrameInterval, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use coach_lib::core::video::{Frame, StreamInfo};
use coach_lib::VideoCoach;
use log::error;
use std::path::PathBuf;
use std::process;

/// Prints progress the way the upload page shows it.
struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_stream_opened(&self, info: &StreamInfo) {
        println!(
            "Video duration: {:.1}s, FPS: {:.2}",
            info.duration_secs, info.fps
        );
    }

    fn on_frame_sampled(&self, frame: &Frame) {
        println!("\n{}", frame.caption());
    }

    fn on_frame_analyzed(&self, result: &FrameResult) {
        println!("AI description: {}", result.description);
    }
}

fn main() {
    coach_lib::init_logging();

    let matches = Command::new("video-coach")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples frames from a sports video and turns them into coaching advice.")
        .arg(
            Arg::new("video")
                .value_name("VIDEO")
                .help("Video file to analyze (.mp4)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("Seconds between analyzed frames (1-10)")
                .value_parser(value_parser!(u32).range(MIN_INTERVAL_SECS as i64..=MAX_INTERVAL_SECS as i64)),
        )
        .get_matches();

    let config = match CoachConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            process::exit(2);
        }
    };

    let interval = match matches.get_one::<u32>("interval") {
        Some(&secs) => match FrameInterval::new(secs) {
            Ok(interval) => interval,
            Err(e) => {
                error!("❌ {}", e);
                process::exit(2);
            }
        },
        None => config.interval,
    };

    let Some(video) = matches.get_one::<PathBuf>("video") else {
        process::exit(2);
    };

    let coach = match VideoCoach::create(config) {
        Ok(coach) => coach,
        Err(e) => {
            error!("❌ {}", e);
            process::exit(2);
        }
    };

    let cancel = coach.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        error!("Could not install Ctrl-C handler: {}", e);
    }

    match coach.analyze_file(video, interval, &ConsoleObserver) {
        Ok(report) => {
            println!("\n== Summary of feedback ==");
            if report.no_frames_processed() {
                println!("No frames processed");
                return;
            }
            println!("{}", report.timeline());
            if let Some(advice) = report.advice {
                println!("\n== Coaching suggestions ==\n{}", advice);
            }
        }
        Err(e @ (PipelineError::Aggregation { .. } | PipelineError::Cancelled { .. })) => {
            error!("❌ {}", e);
            println!("\n== Summary of feedback ==");
            for result in e.partial_results().iter().filter(|r| r.is_usable()) {
                println!("At {:.1}s: {}", result.timestamp_secs, result.description);
            }
            process::exit(1);
        }
        Err(e) => {
            error!("❌ {}", e);
            process::exit(1);
        }
    }
}
