mod common;

use std::fs;

use common::{memory_fs, options};
use kiln::{Bundler, BundlerOptions, InputItem};

#[tokio::test]
async fn writes_outputs_and_metafile_to_disk() {
  let dir = tempfile::tempdir().unwrap();
  let src = dir.path().join("src");
  fs::create_dir_all(&src).unwrap();
  fs::write(src.join("main.js"), "import('./lazy.js');\nconsole.log('main');\n").unwrap();
  fs::write(src.join("lazy.js"), "export const lazy = true;\n").unwrap();

  let mut bundler = Bundler::new(BundlerOptions {
    input: Some(vec![InputItem::from("./src/main.js")]),
    cwd: Some(dir.path().to_path_buf()),
    splitting: Some(true),
    metafile: Some(true),
    sourcemap: Some(true),
    ..BundlerOptions::default()
  });
  let written = bundler.write().await.unwrap();

  let files = &written.written_files;
  assert_eq!(files.len(), 5, "{files:?}");
  assert_eq!(files[0], "dist/main.js");
  assert!(files[1].starts_with("dist/lazy-") && files[1].ends_with(".js"), "{files:?}");
  assert_eq!(files[2], "dist/main.js.map");
  assert_eq!(files[4], "dist/metafile.json");
  for file in files {
    assert!(dir.path().join(file).is_file(), "{file} was not written");
  }
  let main = fs::read_to_string(dir.path().join("dist/main.js")).unwrap();
  assert!(main.contains("import(\"./lazy-"), "{main}");

  let metafile: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(dir.path().join("dist/metafile.json")).unwrap())
      .unwrap();
  assert!(metafile["inputs"]["src/lazy.js"].is_object(), "{metafile}");
  assert_eq!(metafile["outputs"]["dist/main.js"]["entryPoint"], "src/main.js");
}

#[tokio::test]
async fn writes_into_the_given_file_system() {
  let fs = memory_fs(&[("src/main.js", "console.log('hi');\n")]);
  let mut bundler =
    common::bundler(&fs, BundlerOptions { dir: Some("build".to_string()), ..options(&["./src/main.js"]) });
  let written = bundler.write().await.unwrap();

  assert_eq!(written.written_files, vec!["build/main.js"]);
  assert!(fs.paths().iter().any(|path| path.ends_with("build/main.js")));
  assert!(fs.paths().iter().all(|path| !path.ends_with("build/metafile.json")));
}

#[tokio::test]
async fn closed_bundlers_refuse_to_build() {
  let fs = memory_fs(&[("src/main.js", "console.log('hi');\n")]);
  let mut bundler = common::bundler(&fs, options(&["./src/main.js"]));
  bundler.build().await.unwrap();
  bundler.close();
  assert!(bundler.closed);
  assert!(bundler.build().await.is_err());
}
