//! Dense numerical kernels for the contact-force solve: a pivoted LDL^T
//! factorization for symmetric positive semi-definite systems and a
//! Dantzig-style principal pivoting solver for the contact LCP.
//!
//! Matrices are row-major `n * n` slices of `f64`; all scratch lives in
//! plain vectors.
use glam::DMat3;
use thiserror::Error;
use tracing::trace;

/// Slack below which a contact acceleration counts as negative; the pivoting
/// can leave `a_d` a hair under zero without that being a violation.
const LCP_SLACK: f64 = -1e-14;

#[derive(Debug, Error)]
pub enum LcpError {
    /// `maxstep` found no index limiting the step along the current drive
    /// direction.
    #[error("no binding index while driving contact {drive}")]
    NoBindingIndex { drive: usize },
    /// The limiting step has zero length and does not finish the drive; the
    /// pivoting cannot make progress.
    #[error("zero-length step while driving contact {drive} (binding index {index})")]
    ZeroStep { drive: usize, index: usize },
    /// Pivoting finished but the driven acceleration stayed negative.
    #[error("contact {drive} still accelerates inward after pivoting (a = {value})")]
    Stalled { drive: usize, value: f64 },
}

/// `res = mat * vec` for a row-major `n * n` matrix.
pub fn mat_mul_vec(res: &mut [f64], mat: &[f64], vec: &[f64], n: usize) {
    for i in 0..n {
        res[i] = 0.;
        for j in 0..n {
            res[i] += mat[i * n + j] * vec[j];
        }
    }
}

/// Solves `A x = b` for symmetric positive semi-definite `A` using an LDL^T
/// factorization with diagonal pivoting.
///
/// Semi-definite directions (pivots below tolerance) contribute zero to the
/// solution, which is exact for the consistent systems the contact solver
/// produces.
pub fn lp_solve(amat: &[f64], xvec: &mut [f64], bvec: &[f64], n: usize) {
    let mut work = amat.to_vec();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut diag = vec![0.; n];

    let max_diag = (0..n).fold(0.0_f64, |m, i| m.max(work[i * n + i].abs()));
    let tol = 1e-12 * max_diag.max(1e-300);

    let mut rank = n;
    for k in 0..n {
        // symmetric pivoting on the largest remaining diagonal entry
        let p = (k..n)
            .max_by(|&i, &j| work[i * n + i].total_cmp(&work[j * n + j]))
            .unwrap();
        if p != k {
            perm.swap(k, p);
            for j in 0..n {
                work.swap(k * n + j, p * n + j);
            }
            for i in 0..n {
                work.swap(i * n + k, i * n + p);
            }
        }

        let d = work[k * n + k];
        if d <= tol {
            rank = k;
            break;
        }
        diag[k] = d;

        for i in (k + 1)..n {
            let l = work[i * n + k] / d;
            for j in (k + 1)..n {
                work[i * n + j] -= l * work[k * n + j];
            }
            work[i * n + k] = l;
        }
    }

    // z = L^-1 P b
    let mut z = vec![0.; n];
    for i in 0..rank {
        let mut sum = bvec[perm[i]];
        for j in 0..i {
            sum -= work[i * n + j] * z[j];
        }
        z[i] = sum;
    }

    // y = L^-T D^-1 z
    let mut y = vec![0.; n];
    for i in (0..rank).rev() {
        let mut sum = z[i] / diag[i];
        for j in (i + 1)..rank {
            sum -= work[j * n + i] * y[j];
        }
        y[i] = sum;
    }

    // x = P^T y; truncated directions stay zero
    for i in 0..n {
        xvec[perm[i]] = y[i];
    }
}

/// Computes the change of `f` when driving index `d`: `delta_f[d] = 1` and
/// the tight set C moves so that the accelerations of its members stay zero,
/// `A_CC delta_f_C = -A_Cd`.
fn fdirection(fvec_delta: &mut [f64], amat: &[f64], c: &[bool], n: usize, d: usize) {
    fvec_delta.fill(0.);
    fvec_delta[d] = 1.;

    let members: Vec<usize> = (0..n).filter(|&i| c[i]).collect();
    if members.is_empty() {
        return;
    }

    let m = members.len();
    let mut amat_cc = vec![0.; m * m];
    for (si, &i) in members.iter().enumerate() {
        for (sj, &j) in members.iter().enumerate() {
            amat_cc[si * m + sj] = amat[i * n + j];
        }
    }

    let neg_col: Vec<f64> = members.iter().map(|&i| -amat[i * n + d]).collect();

    let mut x = vec![0.; m];
    lp_solve(&amat_cc, &mut x, &neg_col, m);

    for (si, &i) in members.iter().enumerate() {
        fvec_delta[i] = x[si];
    }
}

/// Largest step `s >= 0` along `(fvec_delta, avec_delta)` that keeps the
/// forces of C and the accelerations of NC non-negative and does not
/// overshoot `a_d = 0`. Returns the step and the first binding index.
#[allow(clippy::too_many_arguments)]
fn maxstep(
    fvec: &[f64],
    avec: &[f64],
    fvec_delta: &[f64],
    avec_delta: &[f64],
    c: &[bool],
    nc: &[bool],
    n: usize,
    d: usize,
) -> Result<(f64, usize), LcpError> {
    let mut s = f64::MAX;
    let mut j = None;

    if avec_delta[d] > 0. {
        j = Some(d);
        s = -avec[d] / avec_delta[d];
    }

    for i in 0..n {
        if c[i] && fvec_delta[i] < 0. {
            let s_prime = -fvec[i] / fvec_delta[i];
            if s_prime < s {
                s = s_prime;
                j = Some(i);
            }
        }
    }

    for i in 0..n {
        if nc[i] && avec_delta[i] < 0. {
            let s_prime = -avec[i] / avec_delta[i];
            if s_prime < s {
                s = s_prime;
                j = Some(i);
            }
        }
    }

    match j {
        None => Err(LcpError::NoBindingIndex { drive: d }),
        Some(j) if s == 0. && j != d => Err(LcpError::ZeroStep { drive: d, index: j }),
        Some(_) if s == f64::MAX => Err(LcpError::NoBindingIndex { drive: d }),
        Some(j) => Ok((s, j)),
    }
}

/// Increases `f_d` until `a_d` reaches zero, pivoting indices between the
/// tight set C and the free set NC whenever one of their constraints binds
/// first.
fn drive_to_zero(
    amat: &[f64],
    avec: &mut [f64],
    fvec: &mut [f64],
    c: &mut [bool],
    nc: &mut [bool],
    n: usize,
    d: usize,
) -> Result<(), LcpError> {
    let mut fvec_delta = vec![0.; n];
    let mut avec_delta = vec![0.; n];

    loop {
        fdirection(&mut fvec_delta, amat, c, n, d);
        mat_mul_vec(&mut avec_delta, amat, &fvec_delta, n);

        let (s, j) = maxstep(fvec, avec, &fvec_delta, &avec_delta, c, nc, n, d)?;

        for i in 0..n {
            fvec[i] += s * fvec_delta[i];
            avec[i] += s * avec_delta[i];
        }

        if c[j] {
            // a tight force hit zero, free it
            c[j] = false;
            nc[j] = true;
        } else if nc[j] {
            // a free acceleration hit zero, tighten it
            nc[j] = false;
            c[j] = true;
        } else {
            // j is d itself, a_d reached zero
            c[j] = true;
            return Ok(());
        }
    }
}

/// Solves the contact-force LCP: given symmetric PSD `amat` and `bvec`, finds
/// `fvec >= 0` with `a = A f + b >= 0` and `f^T a = 0`.
pub fn qp_solve(amat: &[f64], bvec: &[f64], fvec: &mut [f64], n: usize) -> Result<(), LcpError> {
    fvec.fill(0.);
    let mut avec = bvec.to_vec();

    let mut c = vec![false; n];
    let mut nc = vec![false; n];

    loop {
        // the slack absorbs the tiny negative values pivoting leaves behind
        let Some(d) = (0..n).find(|&d| avec[d] < LCP_SLACK) else {
            return Ok(());
        };
        trace!(drive = d, a = avec[d], "driving contact acceleration to zero");
        drive_to_zero(amat, &mut avec, fvec, &mut c, &mut nc, n, d)?;
        if avec[d] < LCP_SLACK {
            return Err(LcpError::Stalled {
                drive: d,
                value: avec[d],
            });
        }
    }
}

/// Gram-Schmidt orthonormalization of the columns, first column kept.
pub fn orthonormalize(m: DMat3) -> DMat3 {
    let x = m.x_axis.normalize();
    let y = (m.y_axis - x * m.y_axis.dot(x)).normalize();
    let z = (m.z_axis - x * m.z_axis.dot(x) - y * m.z_axis.dot(y)).normalize();
    DMat3::from_cols(x, y, z)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::dvec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn lp_solve_recovers_a_known_solution() {
        // A = [[4, 2], [2, 3]], x = (1, -2), b = A x = (0, -4)
        let amat = [4., 2., 2., 3.];
        let bvec = [0., -4.];
        let mut xvec = [0.; 2];
        lp_solve(&amat, &mut xvec, &bvec, 2);
        assert_relative_eq!(xvec[0], 1., epsilon = 1e-12);
        assert_relative_eq!(xvec[1], -2., epsilon = 1e-12);
    }

    #[test]
    fn lp_solve_handles_semidefinite_systems() {
        // second direction is null; a consistent rhs must still solve
        let amat = [1., 0., 0., 0.];
        let bvec = [2., 0.];
        let mut xvec = [0.; 2];
        lp_solve(&amat, &mut xvec, &bvec, 2);
        assert_relative_eq!(xvec[0], 2., epsilon = 1e-12);
        assert_relative_eq!(xvec[1], 0., epsilon = 1e-12);
    }

    #[test]
    fn qp_solve_single_supporting_contact() {
        // one contact opposing a unit of inward acceleration
        let amat = [1.];
        let bvec = [-9.81];
        let mut fvec = [0.];
        qp_solve(&amat, &bvec, &mut fvec, 1).unwrap();
        assert_relative_eq!(fvec[0], 9.81, epsilon = 1e-12);
    }

    #[test]
    fn qp_solve_leaves_separating_contacts_free() {
        let amat = [1., 0., 0., 1.];
        let bvec = [-1., 2.];
        let mut fvec = [0.; 2];
        qp_solve(&amat, &bvec, &mut fvec, 2).unwrap();
        assert_relative_eq!(fvec[0], 1., epsilon = 1e-12);
        assert_relative_eq!(fvec[1], 0., epsilon = 1e-12);
    }

    #[test]
    fn qp_solve_satisfies_complementarity_on_random_systems() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = 6;
            // A = M M^T + 0.5 I is symmetric positive definite
            let m: Vec<f64> = (0..n * n).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let mut amat = vec![0.; n * n];
            for i in 0..n {
                for j in 0..n {
                    for k in 0..n {
                        amat[i * n + j] += m[i * n + k] * m[j * n + k];
                    }
                }
                amat[i * n + i] += 0.5;
            }
            let bvec: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();

            let mut fvec = vec![0.; n];
            qp_solve(&amat, &bvec, &mut fvec, n).unwrap();

            let mut avec = vec![0.; n];
            mat_mul_vec(&mut avec, &amat, &fvec, n);
            for i in 0..n {
                avec[i] += bvec[i];
                assert!(fvec[i] >= -1e-10, "negative force {}", fvec[i]);
                assert!(avec[i] >= -1e-8, "negative acceleration {}", avec[i]);
                assert!(
                    (fvec[i] * avec[i]).abs() <= 1e-8,
                    "complementarity violated: f = {}, a = {}",
                    fvec[i],
                    avec[i]
                );
            }
        }
    }

    #[test]
    fn orthonormalize_restores_a_drifted_rotation() {
        let m = DMat3::from_cols(
            dvec3(1., 0.01, 0.),
            dvec3(-0.02, 1., 0.01),
            dvec3(0., -0.01, 1.),
        );
        let q = orthonormalize(m);
        let qtq = q.transpose() * q;
        for (i, col) in [qtq.x_axis, qtq.y_axis, qtq.z_axis].iter().enumerate() {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert_relative_eq!(col[j], expected, epsilon = 1e-12);
            }
        }
    }
}
