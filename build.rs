// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
};

// Use the "built" crate to generate some useful build-time information,
// including the git hash and compiler version.
fn write_built() {
    built::write_built_file().expect("Failed to acquire build-time information");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR env. variable not defined!"));

    // This block of code forces hyperdft to recompile its binaries everytime
    // we do a release build.
    if env::var("DEBUG").as_deref() == Ok("false") {
        let p = Path::new(&out_dir).join("rebuild_stamp");
        File::create(&p).expect("Couldn't create the rebuild stamp");
        println!("cargo:rerun-if-changed={}", p.display());
    }

    write_built();

    #[cfg(all(feature = "cuda", feature = "hip"))]
    compile_error!("Both 'cuda' and 'hip' features are enabled; only one can be used.");

    #[cfg(any(feature = "cuda", feature = "hip"))]
    gpu::build();
}

#[cfg(any(feature = "cuda", feature = "hip"))]
mod gpu {
    use std::env;

    #[cfg(feature = "cuda")]
    const DEFAULT_CUDA_ARCHES: &[u16] = &[60, 70, 80];
    #[cfg(feature = "cuda")]
    const DEFAULT_CUDA_SMS: &[u16] = &[60, 70, 75, 80, 86];

    #[cfg(feature = "cuda")]
    fn parse_and_validate_compute(c: &str, var: &str) -> Vec<u16> {
        let mut out = vec![];
        for compute in c.trim().split(',') {
            // Check that there's only two numeric characters.
            if compute.len() != 2 {
                panic!("When parsing {var}, found '{compute}', which is not a two-digit number!")
            }

            match compute.parse() {
                Ok(p) => out.push(p),
                Err(_) => panic!("'{compute}', part of {var}, couldn't be parsed into a number!"),
            }
        }
        out
    }

    pub(super) fn build() {
        // Find .cu, .h and .cuh files; if any of them change, tell cargo to
        // recompile.
        for entry in std::fs::read_dir("src_gpu").expect("src_gpu directory doesn't exist!") {
            let entry = entry.expect("Couldn't access file in src_gpu directory");
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if let Some("cu" | "h" | "cuh") = path.extension().and_then(|os_str| os_str.to_str())
            {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }

        let mut gpu_target = cc::Build::new();

        #[cfg(feature = "cuda")]
        {
            println!("cargo:rerun-if-env-changed=HYPERDFT_CUDA_COMPUTE");
            let (arches, sms) = match env::var("HYPERDFT_CUDA_COMPUTE") {
                // When a user-supplied variable exists, use it as the CUDA arch
                // and compute level.
                Ok(c) => {
                    let compute = parse_and_validate_compute(&c, "HYPERDFT_CUDA_COMPUTE");
                    let sms = compute.clone();
                    (compute, sms)
                }
                Err(_) => {
                    println!("cargo:warning=No HYPERDFT_CUDA_COMPUTE; Passing arch=compute_{DEFAULT_CUDA_ARCHES:?} and code=sm_{DEFAULT_CUDA_SMS:?} to nvcc");
                    (DEFAULT_CUDA_ARCHES.to_vec(), DEFAULT_CUDA_SMS.to_vec())
                }
            };

            gpu_target.cuda(true).cudart("shared");

            // Loop over each arch and sm
            for arch in arches {
                for &sm in &sms {
                    if sm < arch {
                        continue;
                    }

                    gpu_target.flag("-gencode");
                    gpu_target.flag(&format!("arch=compute_{arch},code=sm_{sm}"));
                }
            }
        }

        #[cfg(feature = "hip")]
        {
            println!("cargo:rerun-if-env-changed=HIP_PATH");
            let hip_path = env::var("HIP_PATH").unwrap_or_else(|_| "/opt/rocm".to_string());
            println!("cargo:rustc-link-search=native={hip_path}/lib");
            println!("cargo:rustc-link-lib=dylib=amdhip64");
            gpu_target
                .cpp(true)
                .compiler(format!("{hip_path}/bin/hipcc"))
                .define("__HIP_PLATFORM_AMD__", None)
                .define("__HIP_PLATFORM_HCC__", None)
                .flag("-xhip");

            println!("cargo:rerun-if-env-changed=HYPERDFT_HIP_ARCH");
            if let Ok(arch) = env::var("HYPERDFT_HIP_ARCH") {
                gpu_target.flag(&format!("--offload-arch={arch}"));
            }
        }

        gpu_target.define(
            // The DEBUG env. variable is set by cargo. If running "cargo build
            // --release", DEBUG is "false", otherwise "true". C/C++/CUDA like
            // the compile option "NDEBUG" to be defined when using assert.h, so
            // if appropriate, define that here. We also define "DEBUG" so that
            // can be used.
            match env::var("DEBUG").as_deref() {
                Ok("false") => "NDEBUG",
                _ => "DEBUG",
            },
            None,
        );

        // If we're told to, use single-precision floats. The default in the GPU
        // code is to use double-precision.
        #[cfg(feature = "gpu-single")]
        gpu_target.define("SINGLE", None);

        gpu_target
            .file("src_gpu/dft.cu")
            .file("src_gpu/utils.cu")
            .compile("hyperdft_gpu");
    }
}
