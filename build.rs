use std::{env, path::PathBuf};

// ffmpeg-sys-next finds FFmpeg through pkg-config on Unix. Windows builds
// need an explicit location, usually a vcpkg install.
fn main() {
    // ffmpeg-sys-next publishes the detected FFmpeg version as
    // DEP_FFMPEG_FFMPEG_<major>_<minor>. Stream display matrices moved to
    // codec parameter side data in 6.1.
    println!("cargo::rustc-check-cfg=cfg(ffmpeg_coded_side_data)");
    if env::var_os("DEP_FFMPEG_FFMPEG_6_1").is_some() {
        println!("cargo::rustc-cfg=ffmpeg_coded_side_data");
    }

    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=vtg: set FFMPEG_DIR to an FFmpeg install to build on Windows.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.join("include").join("libavformat").exists() {
        println!(
            "cargo:warning=vtg: found FFmpeg under {}; set FFMPEG_DIR to it if discovery fails.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=vtg: no FFmpeg headers under {}; install ffmpeg with vcpkg or set FFMPEG_DIR.",
            candidate.display()
        );
    }
}
