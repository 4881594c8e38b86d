use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};
use vergen_gitcl::{Emitter as GitEmitter, GitclBuilder};

type BuildResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> BuildResult<()> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;

    let cargo = CargoBuilder::default()
        .opt_level(true)
        .target_triple(true)
        .build()?;

    let rustc = RustcBuilder::default().semver(true).channel(true).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .emit()?;

    // Git metadata is optional; build_info falls back when it is missing
    let gitcl = GitclBuilder::default()
        .sha(true)
        .branch(true)
        .commit_timestamp(true)
        .dirty(true)
        .build()?;
    GitEmitter::default().add_instructions(&gitcl)?.emit()?;

    let target_dir = target_dir()?;
    copy_profiles(&target_dir)?;
    copy_dir("keymaps", &target_dir.join("keymaps"))?;

    Ok(())
}

/// `target/{profile}` derived from OUT_DIR (`target/{profile}/build/keytouch-xxx/out`)
fn target_dir() -> BuildResult<PathBuf> {
    let out_dir = env::var("OUT_DIR")?;
    Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .map(Path::to_path_buf)
        .ok_or_else(|| "could not determine target directory".into())
}

/// Release builds ship only the release profile; debug builds ship both
fn copy_profiles(target_dir: &Path) -> BuildResult<()> {
    let profiles: &[&str] = if env::var("PROFILE")? == "release" {
        &["release"]
    } else {
        &["debug", "release"]
    };

    let config_out = target_dir.join("config");
    fs::create_dir_all(&config_out)?;
    for profile in profiles {
        copy_file(
            &Path::new("config").join(format!("{profile}.toml")),
            &config_out,
        )?;
    }
    Ok(())
}

fn copy_dir(source: &str, dest: &Path) -> BuildResult<()> {
    let source = Path::new(source);
    if !source.is_dir() {
        return Ok(());
    }
    println!("cargo:rerun-if-changed={}", source.display());

    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            copy_file(&path, dest)?;
        }
    }
    Ok(())
}

fn copy_file(source: &Path, dest_dir: &Path) -> BuildResult<()> {
    let Some(name) = source.file_name() else {
        return Ok(());
    };
    if source.exists() {
        fs::copy(source, dest_dir.join(name))?;
        println!("cargo:rerun-if-changed={}", source.display());
    }
    Ok(())
}
