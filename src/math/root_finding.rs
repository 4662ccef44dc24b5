use super::intervals::Interval;

// Adapted from `rtsafe` in http://www.grad.hr/nastava/gs/prg/NumericalRecipesinC.pdf
//
// `interval` must bracket a sign change of f. Bisection halves the bracket at
// least every other step, so 100 iterations is plenty for f64.
#[allow(clippy::float_cmp)]
pub fn newton_plus_bisection(
    f_and_f_prime: impl Fn(f64) -> (f64, f64),
    mut interval: Interval,
    num_iterations: usize,
) -> f64 {
    let mut guess = interval.midpoint();
    let lo_is_neg = f_and_f_prime(interval.lo()).0 < 0.0;

    for _ in 0..num_iterations {
        let (f, f_prime) = f_and_f_prime(guess);
        if f == 0.0 {
            return guess;
        }

        interval = match (lo_is_neg, f < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        };

        if interval.is_exhausted() {
            return guess;
        }

        // Newton steps that land outside (or on the edge of) the bracket don't
        // shrink it, so fall back to the midpoint.
        let newton_guess = guess - f / f_prime;
        guess = if interval.contains(newton_guess)
            && newton_guess != interval.lo()
            && newton_guess != interval.hi()
        {
            newton_guess
        } else {
            interval.midpoint()
        };
    }

    panic!(
        "Hit max iterations ({}) when trying to find a root in {}",
        num_iterations, interval
    );
}
