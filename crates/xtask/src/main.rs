use std::path::PathBuf;

mod video_build;

use video_build::{BuildOptions, VideoSystemBuilder};

const USAGE: &str = "Usage: cargo xtask <command>

Commands:
  build-video-system [--source DIR] [--out DIR] [--no-minify] [--keep-comments] [--keep-debug] [--bundle]";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("build-video-system") => build_video_system(args.collect()),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}\n\n{USAGE}"),
        None => anyhow::bail!("{USAGE}"),
    }
}

fn build_video_system(args: Vec<String>) -> anyhow::Result<()> {
    let mut options = BuildOptions::default();
    let mut source = PathBuf::from(".");
    let mut out = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-minify" => options.minify = false,
            "--keep-comments" => options.remove_comments = false,
            "--keep-debug" => options.remove_debug_code = false,
            "--bundle" => options.bundle_files = true,
            "--source" => {
                source = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| anyhow::anyhow!("--source needs a directory"))?;
            }
            "--out" => {
                out = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow::anyhow!("--out needs a directory"))?,
                );
            }
            other => anyhow::bail!("Unknown flag: {other}\n\n{USAGE}"),
        }
    }

    let build_dir = out.unwrap_or_else(|| source.join("build"));
    let summary = VideoSystemBuilder::new(source, build_dir, options).build()?;
    println!(
        "Build completed: {} files, {} bytes",
        summary.files.len(),
        summary.total_size
    );
    Ok(())
}
