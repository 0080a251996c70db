// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The hyperdft binary.

use clap::Parser;

use hyperdft::Hyperdft;

fn main() {
    // Run hyperdft, only performing extra steps if it returned an error.
    if let Err(e) = Hyperdft::parse().run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
