//! Engines command

use esvm_core::engines;
use esvm_schema::Platform;

use crate::ui::list::{engines_header, engines_row};

/// Print every known engine and whether it has builds for `platform`
pub fn engines(platform: Platform) {
    println!();
    println!("{}", engines_header());
    for config in engines::configs() {
        println!("{}", engines_row(config, platform));
    }
    println!();
}
