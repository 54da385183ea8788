error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        // stack errors
        StackUnderflow
        AllocationFailure(slots: usize) {
            display("Allocation Failure: cannot grow to {} slots", slots)
        }

        // type errors
        TypeMismatch(expected: &'static str, found: String) {
            display("Type Mismatch: expected {} but got {}", expected, found)
        }
        InvalidRepeatCount(count: String) {
            display("Invalid Repeat Count: {}", count)
        }

        // parsing errors
        UnknownToken(token: String) {
            display("Unknown Token: {}", token)
        }
        UnterminatedString

        // word definition errors
        DictionaryConflict(name: String) {
            display("Dictionary Conflict: {:?} names a builtin", name)
        }
        InvalidWordName(name: String) {
            display("Invalid Word Name: {:?}", name)
        }
        UnmatchedEnd
        NestingTooDeep(limit: usize) {
            display("Nesting Too Deep: words nest at most {} levels", limit)
        }
        CollapseInCapture

        // raised by `exit` and turned into `Flow::Exit` by `State::eval_line`
        ExitRequested(status: i32)
    }
}
