//! Integer curve math for token-swap pools.
//!
//! Constant product follows `x * y = k` with ceiling division on the new
//! output reserve. The stable curve is the two-coin StableSwap invariant
//! solved with Newton iterations. Every product is taken in 256 bits.

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

const N_COINS: u64 = 2;
const N_COINS_SQUARED: u64 = 4;
const MAX_ITERATIONS: usize = 32;

/// Saturating narrowing to `u64`.
pub fn to_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.low_u64()
    }
}

/// Division yielding zero on a zero divisor.
fn divide(dividend: U256, divisor: U256) -> U256 {
    if divisor.is_zero() {
        U256::zero()
    } else {
        dividend / divisor
    }
}

/// Rounds up, except that a zero quotient stays zero.
pub fn ceiling_division(dividend: U256, divisor: U256) -> U256 {
    let quotient = divide(dividend, divisor);
    if quotient.is_zero() {
        return quotient;
    }
    if !(dividend % divisor).is_zero() {
        quotient + 1
    } else {
        quotient
    }
}

pub fn compute_fee(base_amount: u64, fee_numerator: u64, fee_denominator: u64) -> u64 {
    if fee_numerator == 0 {
        return 0;
    }
    to_u64(divide(
        U256::from(base_amount) * U256::from(fee_numerator),
        U256::from(fee_denominator),
    ))
}

pub fn constant_product_output(input_amount: u64, pool_input: u64, pool_output: u64) -> u64 {
    let invariant = U256::from(pool_input) * U256::from(pool_output);
    let new_pool_output = ceiling_division(invariant, U256::from(pool_input) + U256::from(input_amount));
    pool_output.saturating_sub(to_u64(new_pool_output))
}

/// Input (fees excluded) needed to take `output_amount` out of the pool.
pub fn constant_product_input(output_amount: u64, pool_input: u64, pool_output: u64) -> u64 {
    let invariant = U256::from(pool_input) * U256::from(pool_output);
    let new_pool_input = ceiling_division(invariant, U256::from(pool_output.saturating_sub(output_amount)));
    to_u64(new_pool_input).saturating_sub(pool_input)
}

/// Grosses `amount` up by `numerator / denominator`.
pub fn apply_ratio(amount: u64, numerator: U256, denominator: U256) -> u64 {
    to_u64(divide(U256::from(amount) * numerator, denominator))
}

// d = (leverage * sum_x + d_product * n_coins) * initial_d
//     / ((leverage - 1) * initial_d + (n_coins + 1) * d_product)
fn calculate_step(initial_d: U256, leverage: u64, sum_x: U256, d_product: U256) -> U256 {
    let leverage_val = (U256::from(leverage) * sum_x + d_product * U256::from(N_COINS)) * initial_d;
    let r_val = initial_d * U256::from(leverage.saturating_sub(1)) + d_product * U256::from(N_COINS + 1);
    divide(leverage_val, r_val)
}

/// StableSwap invariant `D` for two balances.
pub fn compute_d(leverage: u64, amount_a: u64, amount_b: u64) -> U256 {
    let amount_a_times_n = U256::from(amount_a) * U256::from(N_COINS) + 1;
    let amount_b_times_n = U256::from(amount_b) * U256::from(N_COINS) + 1;
    let sum_x = U256::from(amount_a) + U256::from(amount_b);
    if sum_x.is_zero() {
        return sum_x;
    }

    let mut d = sum_x;
    for _ in 0..MAX_ITERATIONS {
        let mut d_product = d;
        d_product = d_product * d / amount_a_times_n;
        d_product = d_product * d / amount_b_times_n;
        let d_previous = d;
        d = calculate_step(d, leverage, sum_x, d_product);
        if d == d_previous {
            break;
        }
    }
    d
}

/// Solve `y^2 + b*y = c` for the opposite reserve once one side holds
/// `new_amount`.
fn compute_new_opposite_amount(leverage: u64, new_amount: u64, d: U256) -> U256 {
    let new_amount = U256::from(new_amount);
    let c = divide(
        d * d * d,
        new_amount * U256::from(N_COINS_SQUARED) * U256::from(leverage),
    );
    let b = new_amount + divide(d, U256::from(leverage));

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_previous = y;
        let Some(denominator) = (y * 2u64 + b).checked_sub(d) else {
            break;
        };
        y = divide(y * y + c, denominator);
        if y == y_previous {
            break;
        }
    }
    y
}

pub fn stable_output(input_amount: u64, pool_input: u64, pool_output: u64, amp: u64) -> u64 {
    let leverage = amp.saturating_mul(N_COINS);
    let new_pool_input = input_amount.saturating_add(pool_input);
    let d = compute_d(leverage, pool_input, pool_output);
    let new_pool_output = compute_new_opposite_amount(leverage, new_pool_input, d);
    pool_output.saturating_sub(to_u64(new_pool_output))
}

/// Input (fees excluded) needed to take `output_amount` out of a stable pool.
pub fn stable_input(output_amount: u64, pool_input: u64, pool_output: u64, amp: u64) -> u64 {
    let leverage = amp.saturating_mul(N_COINS);
    let new_pool_output = pool_output.saturating_sub(output_amount);
    let d = compute_d(leverage, pool_output, pool_input);
    let new_pool_input = compute_new_opposite_amount(leverage, new_pool_output, d);
    to_u64(new_pool_input).saturating_sub(pool_input)
}

/// Spot-price output of a stable pool, from the derivative of the invariant.
pub fn stable_base_output(input_amount: u64, pool_input: u64, pool_output: u64, amp: u64) -> u64 {
    let leverage = amp.saturating_mul(N_COINS);
    let invariant = compute_d(leverage, pool_input, pool_output);
    let (x, y) = (U256::from(pool_input), U256::from(pool_output));
    let a = U256::from(amp) * 16u64;

    // c = 4D - 16 * amp * D is negative for any amp >= 1, so it is subtracted
    let c_negated = (invariant * U256::from(amp) * 16u64).saturating_sub(invariant * 4u64);
    let numerator = (a * 2u64 * x + a * y).checked_sub(c_negated).map(|n| n * y);
    let denominator = (a * x + a * 2u64 * y).checked_sub(c_negated).map(|d| d * x);

    match (numerator, denominator) {
        (Some(numerator), Some(denominator)) => {
            to_u64(divide(U256::from(input_amount) * numerator, denominator))
        }
        _ => 0,
    }
}

pub fn constant_product_base_output(input_amount: u64, pool_input: u64, pool_output: u64) -> u64 {
    to_u64(divide(
        U256::from(input_amount) * U256::from(pool_output),
        U256::from(pool_input),
    ))
}
