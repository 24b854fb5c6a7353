use rinvoke::cli::{exit_with, Program};
use rinvoke::demos;

fn main() {
    rinvoke::init_logging();

    let namespace = demos::namespace().unwrap_or_else(|e| exit_with(e.into()));
    if let Err(e) = Program::new("rinvoke", namespace).run() {
        exit_with(e);
    }
}
