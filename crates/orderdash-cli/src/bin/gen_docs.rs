//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", orderdash_cli::render_options_markdown());
}
