use argh::FromArgs;
use serde::Deserialize;
use std::path::PathBuf;

use spla::core::{SparseMatrix, SparseVector};
use spla::linalg::solvers::{LinearSolver, SolverMethod};

#[derive(FromArgs)]
/// Solve a linear system A * x = b and print the solution and the inverse of A
struct Args {
    /// solver to use: cholesky, qr or svd
    #[argh(option, short = 'm', default = "SolverMethod::Cholesky")]
    method: SolverMethod,

    /// path to a json file holding the system as {"a": matrix, "b": vector}
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,
}

#[derive(Deserialize)]
struct System {
    a: SparseMatrix,
    b: SparseVector,
}

fn default_system() -> Result<System, Box<dyn std::error::Error>> {
    let a = SparseMatrix::from_rows(&[
        [25.0, 15.0, -5.0],
        [15.0, 18.0, 0.0],
        [-5.0, 0.0, 11.0],
    ])?;
    let b = a.multiply_vector(&SparseVector::from_slice(&[2.0, 4.0, 1.0]))?;
    Ok(System { a, b })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let System { a, b } = match args.input {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => default_system()?,
    };
    log::info!(
        "solving a {}x{} system with {:?}",
        a.row_count(),
        a.col_count(),
        args.method
    );

    let solver = args.method.solver();
    let x = if a.is_square() {
        solver.solve(&a, &b)?
    } else if a.row_count() > a.col_count() {
        solver.solve_least_squares(&a, &b)?
    } else {
        solver.solve_least_norm(&a, &b)?
    };

    let residual = a.multiply_vector(&x)?.subtract(&b)?;
    println!("x = {x}");
    println!("|A x - b| = {:e}", residual.norm(2));

    if a.is_square() {
        println!("A^-1 =\n{}", solver.invert(&a)?);
    }

    Ok(())
}
