#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use kiln::{
  BuildResult, BundleOutput, Bundler, BundlerOptions, InputItem, MemoryFileSystem, Output,
  SharedFileSystem, SharedPlugin,
};

pub const CWD: &str = "/project";

/// A file system holding `files`, with paths relative to [CWD].
pub fn memory_fs(files: &[(&str, &str)]) -> Arc<MemoryFileSystem> {
  Arc::new(MemoryFileSystem::new(
    files.iter().map(|(path, content)| (PathBuf::from(CWD).join(path), *content)),
  ))
}

pub fn options(input: &[&str]) -> BundlerOptions {
  BundlerOptions {
    input: Some(input.iter().map(|import| InputItem::from(*import)).collect()),
    cwd: Some(PathBuf::from(CWD)),
    ..BundlerOptions::default()
  }
}

pub fn bundler(fs: &Arc<MemoryFileSystem>, options: BundlerOptions) -> Bundler {
  let fs: SharedFileSystem = Arc::clone(fs) as SharedFileSystem;
  Bundler::new(options).with_file_system(fs)
}

pub async fn build(fs: &Arc<MemoryFileSystem>, options: BundlerOptions) -> BuildResult<BundleOutput> {
  bundler(fs, options).build().await
}

pub async fn build_with_plugins(
  fs: &Arc<MemoryFileSystem>,
  options: BundlerOptions,
  plugins: Vec<SharedPlugin>,
) -> BuildResult<BundleOutput> {
  bundler(fs, options).with_plugins(plugins).build().await
}

/// The code of the chunk named `filename`.
pub fn code<'a>(output: &'a BundleOutput, filename: &str) -> &'a str {
  match output.get(filename) {
    Some(Output::Chunk(chunk)) => &chunk.code,
    _ => panic!("no chunk named {filename} in {:?}", filenames(output)),
  }
}

pub fn filenames(output: &BundleOutput) -> Vec<&str> {
  output.assets.iter().map(Output::filename).collect()
}

/// Byte offset of `needle`, which must occur exactly once.
pub fn position_of(code: &str, needle: &str) -> usize {
  assert_eq!(code.matches(needle).count(), 1, "{needle:?} should occur once in:\n{code}");
  code.find(needle).unwrap_or_default()
}
