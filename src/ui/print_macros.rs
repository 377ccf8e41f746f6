use console::StyledObject;
use std::error;
use std::fmt;

pub const TAG_WIDTH: usize = 12;

/// Prints one status line to stderr with the tag right-aligned in a fixed
/// column, cargo style.
pub fn print_tagged<T: fmt::Display>(tag: T, message: fmt::Arguments<'_>) {
    eprintln!("{:>width$} {}", tag, message, width = TAG_WIDTH);
}

pub fn print_causes(quiet: bool, e: &dyn error::Error) {
    if quiet {
        return;
    }

    let mut cause = e.source();
    while let Some(e) = cause {
        crate::eprintln_info!("due to: {}", e);
        cause = e.source();
    }
}

pub fn tag_style(tag: &'static str) -> StyledObject<&'static str> {
    console::style(tag).green().bold()
}

#[macro_export]
macro_rules! eprintln_tagged {
    ($tag:literal: $($args:tt)*) => {
        $crate::ui::print_macros::print_tagged(
            $crate::ui::print_macros::tag_style($tag),
            std::format_args!($($args)*),
        )
    };
}

#[macro_export]
macro_rules! eprintln_error {
    ($($args:tt)*) => {
        $crate::ui::print_macros::print_tagged(
            console::style("Error").red().bold(),
            std::format_args!($($args)*),
        )
    };
}

#[macro_export]
macro_rules! eprintln_warning {
    ($($args:tt)*) => {
        $crate::ui::print_macros::print_tagged(
            console::style("Warning").yellow().bold(),
            std::format_args!($($args)*),
        )
    };
}

#[macro_export]
macro_rules! eprintln_info {
    ($($args:tt)*) => {
        $crate::ui::print_macros::print_tagged(
            console::style("Info").cyan().bold(),
            std::format_args!($($args)*),
        )
    };
}

#[macro_export]
macro_rules! eprintln_debug {
    ($($args:tt)*) => {
        if cfg!(debug_assertions) {
            $crate::ui::print_macros::print_tagged(
                console::style("Debug").magenta(),
                std::format_args!($($args)*),
            )
        }
    };
}
