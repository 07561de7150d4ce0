/// Asserts that running `$run` panics. The block may borrow from its surroundings; any state it
/// leaves behind after the panic shouldn't be relied upon.
#[allow(unused_macros)]
macro_rules! assert_panics {
    ($run:block) => {
        assert_panics!($run, "assertion failed to panic")
    };
    ($run:block, $($msg:tt)+) => {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $run));
        assert!(result.is_err(), $($msg)+);
        println!("^ panic caught");
    };
}

#[allow(unused_imports)]
pub(crate) use assert_panics;
