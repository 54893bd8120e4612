use std::{
  path::Path,
  sync::{atomic::AtomicBool, Arc},
  time::Instant,
};

use kiln_common::{BundlerOptions, Output};
use kiln_error::BuildResult;
use kiln_fs::{OsFileSystem, SharedFileSystem};
use kiln_plugin::{OnEndArgs, PluginDriver, SharedPlugin, SharedPluginDriver};
use kiln_resolver::Resolver;
use kiln_utils::path_ext::PathExt;

use crate::{
  stages::{generate::GenerateStage, link::LinkStage, scan::ScanStage},
  types::{
    bundle_output::{BundleOutput, WriteOutput},
    transform_cache::SharedTransformCache,
    SharedOptions, SharedResolver,
  },
  utils::normalize_options::{normalize_options, NormalizeOptionsReturn},
};

pub struct Bundler {
  pub closed: bool,
  options: BundlerOptions,
  plugins: Vec<SharedPlugin>,
  plugin_driver: Option<SharedPluginDriver>,
  pub(crate) fs: SharedFileSystem,
  pub(crate) cache: Option<SharedTransformCache>,
  pub(crate) disposed: Arc<AtomicBool>,
}

impl Bundler {
  /// Options are checked when a build starts, so an invalid option fails that build.
  pub fn new(options: BundlerOptions) -> Self {
    Self {
      closed: false,
      options,
      plugins: vec![],
      plugin_driver: None,
      fs: Arc::new(OsFileSystem),
      cache: None,
      disposed: Arc::new(AtomicBool::new(false)),
    }
  }

  #[must_use]
  pub fn with_plugins(mut self, plugins: Vec<SharedPlugin>) -> Self {
    self.plugins = plugins;
    self.plugin_driver = None;
    self
  }

  #[must_use]
  pub fn with_file_system(mut self, fs: SharedFileSystem) -> Self {
    self.fs = fs;
    self
  }

  pub async fn build(&mut self) -> BuildResult<BundleOutput> {
    self.bundle().await.map(|(_, output)| output)
  }

  /// Builds and writes every output below the output directory. Nothing is left on disk when
  /// the build fails or a file can't be written.
  pub async fn write(&mut self) -> BuildResult<WriteOutput> {
    let (options, output) = self.bundle().await?;
    let out_dir = options.out_dir();

    let mut files = output
      .assets
      .iter()
      .map(|asset| (out_dir.join(asset.filename()), asset.content_as_bytes().to_vec()))
      .collect::<Vec<_>>();
    if options.metafile {
      let json = output
        .metafile
        .to_json_string()
        .map_err(|err| anyhow::anyhow!("Failed to serialize the metafile: {err}"))?;
      files.push((out_dir.join("metafile.json"), json.into_bytes()));
    }

    let mut written: Vec<&Path> = Vec::with_capacity(files.len());
    for (path, content) in &files {
      let result = path
        .parent()
        .map_or(Ok(()), |parent| self.fs.create_dir_all(parent))
        .and_then(|()| self.fs.write(path, content));
      if let Err(err) = result {
        for written_path in &written {
          // Best effort, the write error is what gets reported.
          let _ = self.fs.remove_file(written_path);
        }
        Err(anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;
      }
      written.push(path.as_path());
    }

    let written_files =
      written.iter().map(|path| path.relative_slash(&options.cwd)).collect::<Vec<_>>();
    tracing::info!(files = written_files.len(), dir = %out_dir.display(), "wrote outputs");
    Ok(WriteOutput { output, written_files })
  }

  /// Releases the plugins. Later builds fail.
  pub fn close(&mut self) {
    self.closed = true;
    self.plugin_driver = None;
    self.plugins.clear();
  }

  /// Plugins are set up once and kept for every later build.
  fn plugin_driver(&mut self) -> BuildResult<SharedPluginDriver> {
    if let Some(driver) = &self.plugin_driver {
      return Ok(Arc::clone(driver));
    }
    let driver = PluginDriver::new_shared(self.plugins.clone())?;
    self.plugin_driver = Some(Arc::clone(&driver));
    Ok(driver)
  }

  async fn bundle(&mut self) -> BuildResult<(SharedOptions, BundleOutput)> {
    if self.closed {
      Err(anyhow::anyhow!("The bundler is closed"))?;
    }
    let build_start = Instant::now();

    let NormalizeOptionsReturn { options, resolve_options } =
      normalize_options(self.options.clone())?;
    let options: SharedOptions = Arc::new(options);
    let resolver: SharedResolver =
      Arc::new(Resolver::new(options.cwd.clone(), Arc::clone(&self.fs), resolve_options));
    let plugin_driver = self.plugin_driver()?;

    let start_warnings = plugin_driver.build_start();
    let result = self.run_stages(&options, resolver, &plugin_driver).await;

    let output = match result {
      Ok(mut output) => {
        let mut warnings = start_warnings;
        warnings.append(&mut output.warnings);
        output.warnings = warnings;
        let end_warnings = plugin_driver.build_end(&OnEndArgs {
          errors: &[],
          warnings: &output.warnings,
          output_files: output.assets.iter().map(Output::filename).collect(),
        });
        output.warnings.extend(end_warnings);
        output
      }
      Err(errors) => {
        plugin_driver.build_end(&OnEndArgs {
          errors: &errors,
          warnings: &start_warnings,
          output_files: vec![],
        });
        tracing::info!(errors = errors.len(), elapsed = ?build_start.elapsed(), "build failed");
        return Err(errors);
      }
    };

    tracing::info!(
      outputs = output.assets.len(),
      warnings = output.warnings.len(),
      elapsed = ?build_start.elapsed(),
      "build finished"
    );
    Ok((options, output))
  }

  async fn run_stages(
    &self,
    options: &SharedOptions,
    resolver: SharedResolver,
    plugin_driver: &SharedPluginDriver,
  ) -> BuildResult<BundleOutput> {
    let stage_start = Instant::now();
    let scan_output = ScanStage::new(
      Arc::clone(&self.fs),
      Arc::clone(options),
      resolver,
      Arc::clone(plugin_driver),
      self.cache.clone(),
      Arc::clone(&self.disposed),
    )
    .scan()
    .await?;
    tracing::info!(
      modules = scan_output.module_table.len(),
      elapsed = ?stage_start.elapsed(),
      "scan stage finished"
    );

    let stage_start = Instant::now();
    let mut link_output = LinkStage::new(scan_output, options).link()?;
    tracing::info!(elapsed = ?stage_start.elapsed(), "link stage finished");

    let stage_start = Instant::now();
    let output = GenerateStage::new(&mut link_output, options).generate().await?;
    tracing::info!(
      assets = output.assets.len(),
      elapsed = ?stage_start.elapsed(),
      "generate stage finished"
    );
    Ok(output)
  }
}

impl std::fmt::Debug for Bundler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Bundler").field("closed", &self.closed).finish_non_exhaustive()
  }
}

