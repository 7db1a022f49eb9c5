//! voice-reply-rs: run the voice reply plugin from the command line,
//! standing in for the chat-bot host.

use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voice_reply::{Config, Context, EventContext, Plugin, TmpDir, VoiceReply};

#[derive(Parser, Debug)]
#[command(name = "voice-reply-rs", about = "Voice Q&A plugin harness")]
struct Args {
    /// Path to config.json (default: next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated audio (default: ./tmp)
    #[arg(short, long)]
    tmp_dir: Option<PathBuf>,

    /// Keep generated audio files instead of deleting them on exit
    #[arg(long)]
    keep_audio: bool,

    /// Print the plugin help text and exit
    #[arg(long)]
    help_text: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Messages to handle; read one per line from stdin if omitted
    messages: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug,reqwest=info,hyper_util=info")
    } else {
        EnvFilter::new("info,reqwest=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.help_text {
        println!("{}", voice_reply::plugin::HELP_TEXT);
        return Ok(());
    }

    let config_path = args.config.unwrap_or_else(Config::default_path);
    let tmp_dir = args.tmp_dir.map(TmpDir::new).unwrap_or_else(TmpDir::host_default);
    let plugin = VoiceReply::new(&config_path, tmp_dir);

    let meta = plugin.meta();
    info!("{} v{} loaded (priority {})", meta.name, meta.version, meta.desire_priority);

    if args.messages.is_empty() {
        for line in std::io::stdin().lock().lines() {
            handle(&plugin, &line?);
        }
    } else {
        for message in &args.messages {
            handle(&plugin, message);
        }
    }

    if args.keep_audio {
        info!("Keeping {} audio file(s)", plugin.pending_files().len());
    } else {
        plugin.cleanup();
    }

    Ok(())
}

fn handle(plugin: &VoiceReply, message: &str) {
    let mut event = EventContext::new(Context::text(message));
    plugin.on_handle_context(&mut event);

    match event.reply {
        Some(reply) => println!("[{}] {reply}", event.action),
        None => println!("[{}] (not handled)", event.action),
    }
}
