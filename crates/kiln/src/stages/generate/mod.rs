mod code_splitting;
mod compute_cross_chunk_links;
mod generate_chunk_name_and_preliminary_filenames;
mod generators;
mod metafile;
mod render_chunk_to_assets;
pub(crate) mod scope_hoisting;

use kiln_error::BuildResult;
use kiln_utils::rayon::{IntoParallelRefMutIterator, ParallelIterator};

use crate::{
  types::{bundle_output::BundleOutput, SharedOptions},
  utils::chunk::{
    deconflict_chunk_symbols::deconflict_chunk_symbols,
    validate_options_for_multi_chunk_output::validate_options_for_multi_chunk_output,
  },
};

use super::link::LinkStageOutput;

pub struct GenerateStage<'a> {
  link_output: &'a mut LinkStageOutput,
  options: &'a SharedOptions,
}

impl<'a> GenerateStage<'a> {
  pub fn new(link_output: &'a mut LinkStageOutput, options: &'a SharedOptions) -> Self {
    Self { link_output, options }
  }

  pub async fn generate(&mut self) -> BuildResult<BundleOutput> {
    let mut chunk_graph = self.generate_chunks()?;
    if chunk_graph.chunk_table.len() > 1 {
      validate_options_for_multi_chunk_output(self.options)?;
    }

    self.compute_cross_chunk_links(&mut chunk_graph);
    self.generate_chunk_name_and_preliminary_filenames(&mut chunk_graph);

    let link_output = &*self.link_output;
    let format = self.options.format;
    chunk_graph.chunk_table.par_iter_mut().for_each(|chunk| {
      deconflict_chunk_symbols(chunk, link_output, format);
    });

    self.render_chunk_to_assets(&chunk_graph).await
  }
}
