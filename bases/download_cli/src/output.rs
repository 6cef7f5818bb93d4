// bases/download_cli/src/output.rs
use std::io::Write;
use std::path::Path;
use video_downloader::{
    FormatOption, InstallGuide, Outcome, PlaylistEvent, PlaylistInfo, PlaylistObserver,
    PlaylistSummary, Preset, ProgressEvent, ProgressSink, ResumeSummary, VideoFormats,
};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60));
        println!("Video downloader");
        println!("{}", "=".repeat(60));
    }

    pub fn print_resume_summary(&self, summary: &ResumeSummary) {
        println!("\nFound an unfinished download:");
        println!("Playlist: {}", summary.playlist_title);
        println!("Downloaded: {}/{}", summary.completed, summary.total);
    }

    pub fn print_restart(&self) {
        println!("Every video was already downloaded, starting over");
    }

    pub fn print_playlist_found(&self, playlist: &PlaylistInfo) {
        println!("\nFound playlist: {}", playlist.title);
        println!("It contains {} videos", playlist.items.len());
    }

    pub fn print_playlist_items(&self, playlist: &PlaylistInfo) {
        println!("\nVideos in the playlist:");
        for (i, item) in playlist.items.iter().enumerate() {
            println!("{}. {}", i + 1, item.title);
        }
    }

    pub fn print_playlist_menu(&self) {
        println!("\nHow should the playlist be downloaded?");
        println!("1. Download every video");
        println!("2. Pick specific videos");
        println!("3. Start from a given position");
    }

    pub fn print_type_menu(&self) {
        println!("\nChoose the download type:");
        println!("1. Video + audio");
        println!("2. Audio only");
        println!("3. Use a preset format (simpler)");
    }

    pub fn print_preset_menu(&self) {
        println!("\nChoose a preset:");
        for (i, preset) in Preset::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, preset.description());
        }
    }

    pub fn print_video_found(&self, formats: &VideoFormats) {
        println!("\nFound video: {}", formats.title);
    }

    pub fn print_no_formats(&self) {
        println!("No downloadable formats were listed for this video.");
        println!("It may be region locked or protected, falling back to presets.");
    }

    pub fn print_format_list(&self, heading: &str, formats: &[FormatOption]) {
        println!("\n{}:", heading);
        for (i, format) in formats.iter().enumerate() {
            println!("{}. {}", i + 1, format);
        }
    }

    pub fn print_download_start(&self, title: &str) {
        println!("\nStarting download of '{}'", title);
    }

    pub fn print_download_complete(&self, output_path: Option<&Path>, outcome: &Outcome) {
        let destination = output_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "the current directory".to_string());
        println!("\nVideo downloaded to {}", destination);

        if self.verbose {
            println!("Format: {}", outcome.selector);
        }
        if outcome.used_fallback {
            println!("Note: the requested format failed, the single best stream was used");
        }
    }

    pub fn print_ffmpeg_found(&self, path: &Path) {
        println!("ffmpeg is installed at {}", path.display());
    }

    pub fn print_install_guide(&self, guide: &InstallGuide) {
        println!("ffmpeg is not installed. It is needed to merge video and audio streams.");
        println!("\nInstalling ffmpeg on {}:", guide.platform);
        for step in &guide.steps {
            println!("  {}", step);
        }
        for command in &guide.commands {
            println!("  $ {}", command);
        }
        println!("\nRe-run the downloader once ffmpeg is installed.");
        println!("Without ffmpeg, choose 'Audio only' or the 'Best audio quality' preset.");
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }

    fn print_summary(&self, summary: &PlaylistSummary) {
        println!("\nPlaylist download finished");
        println!(
            "Succeeded: {}, failed: {}, total: {}",
            summary.succeeded, summary.failed, summary.total
        );
        if self.verbose && summary.skipped > 0 {
            println!("Already downloaded: {}", summary.skipped);
        }
    }
}

impl ProgressSink for OutputHandler {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                percent,
                speed,
                eta,
            } => {
                let percent = percent
                    .map(|p| format!("{:.1}%", p))
                    .unwrap_or_else(|| "?".to_string());
                print!("\rDownloading: {} at {} ETA {}    ", percent, speed, eta);
                let _ = std::io::stdout().flush();
            }
            ProgressEvent::Finished => {
                println!("\nDownload finished, post-processing...");
            }
        }
    }
}

impl PlaylistObserver for OutputHandler {
    fn notify(&self, event: PlaylistEvent<'_>) {
        match event {
            PlaylistEvent::Started {
                title,
                total,
                start_from,
            } => {
                println!("\nDownloading playlist: {}", title);
                println!("{} videos, starting with number {}", total, start_from + 1);
            }
            PlaylistEvent::ItemStarted {
                index,
                total,
                title,
            } => println!("\n[{}/{}] Downloading: {}", index + 1, total, title),
            PlaylistEvent::ItemSkipped { index, title } => {
                println!("\n[{}] Already downloaded, skipping: {}", index + 1, title)
            }
            PlaylistEvent::ItemCompleted {
                title,
                used_fallback,
                ..
            } => {
                println!("Downloaded: {}", title);
                if used_fallback {
                    println!("  (fell back to the single best stream)");
                }
            }
            PlaylistEvent::ItemFailed { title, error, .. } => {
                println!("Failed: {}", title);
                println!("  {}", error);
            }
            PlaylistEvent::CheckpointNotSaved { error } => {
                println!("Could not save download state: {}", error)
            }
            PlaylistEvent::Cooldown {
                after_index,
                duration,
            } => println!(
                "\n{} videos processed, pausing {} seconds to avoid rate limits...",
                after_index + 1,
                duration.as_secs()
            ),
            PlaylistEvent::Finished(summary) => self.print_summary(summary),
        }
    }
}
