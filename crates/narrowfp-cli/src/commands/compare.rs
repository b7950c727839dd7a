use narrowfp::compare::{Tolerance, narrow_ulp_distance, relative_error};
use narrowfp::{NarrowFormat, Rounding, bf16, f16};

fn narrow(value: f32, ty: NarrowFormat) -> u16 {
    match ty {
        NarrowFormat::Bf16 => bf16::encode_with(value, Rounding::NearestEven),
        NarrowFormat::Half => f16::encode_with(value, Rounding::NearestEven),
    }
}

pub fn run(
    actual: f32,
    expected: f32,
    ty: NarrowFormat,
    eps: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tolerance = Tolerance::for_format(ty);
    if let Some(eps) = eps {
        tolerance = tolerance.with_eps(eps);
    }

    println!("relative error: {}", relative_error(actual, expected));
    let steps = narrow_ulp_distance(ty, narrow(actual, ty), narrow(expected, ty));
    if steps == u32::MAX {
        println!("{ty} ulp distance: n/a");
    } else {
        println!("{ty} ulp distance: {steps}");
    }
    println!("tolerance: eps={} ({ty})", tolerance.eps);

    if tolerance.check(actual, expected) {
        println!("equal");
        Ok(())
    } else {
        println!("differ");
        Err(format!("{actual} and {expected} differ beyond {ty} tolerance").into())
    }
}
