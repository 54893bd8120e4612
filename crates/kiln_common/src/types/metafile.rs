use kiln_utils::indexmap::FxIndexMap;
use serde::Serialize;

/// A description of a build: what went in and what came out. Serializes to the same shape as
/// esbuild's metafile.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Metafile {
  pub inputs: FxIndexMap<String, MetafileInput>,
  pub outputs: FxIndexMap<String, MetafileOutput>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetafileInput {
  pub bytes: usize,
  pub imports: Vec<MetafileImport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetafileImport {
  pub path: String,
  pub kind: &'static str,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub external: bool,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafileOutput {
  pub bytes: usize,
  pub inputs: FxIndexMap<String, MetafileOutputInput>,
  pub imports: Vec<MetafileImport>,
  pub exports: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entry_point: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub css_bundle: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafileOutputInput {
  pub bytes_in_output: usize,
}

impl Metafile {
  pub fn to_json_string(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

#[test]
fn test_metafile_shape() {
  let mut metafile = Metafile::default();
  metafile.inputs.insert(
    "src/main.js".to_string(),
    MetafileInput {
      bytes: 20,
      imports: vec![MetafileImport {
        path: "react".to_string(),
        kind: "import-statement",
        external: true,
      }],
      format: Some("esm"),
    },
  );
  let mut output = MetafileOutput { bytes: 10, entry_point: Some("src/main.js".into()), ..Default::default() };
  output.inputs.insert("src/main.js".to_string(), MetafileOutputInput { bytes_in_output: 8 });
  metafile.outputs.insert("dist/main.js".to_string(), output);

  let json: serde_json::Value = serde_json::from_str(&metafile.to_json_string().unwrap()).unwrap();
  assert_eq!(json["inputs"]["src/main.js"]["imports"][0]["external"], true);
  assert_eq!(json["outputs"]["dist/main.js"]["entryPoint"], "src/main.js");
  assert_eq!(json["outputs"]["dist/main.js"]["inputs"]["src/main.js"]["bytesInOutput"], 8);
  assert!(json["outputs"]["dist/main.js"].get("cssBundle").is_none());
}
