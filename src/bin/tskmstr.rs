use rinvoke::cli::exit_with;
use rinvoke::demos::tskmstr;

fn main() {
    rinvoke::init_logging();

    let program = tskmstr::program().unwrap_or_else(|e| exit_with(e.into()));
    if let Err(e) = program.run() {
        exit_with(e);
    }
}
