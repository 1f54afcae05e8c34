use builder_plugin_protocol::{Status, StepStyle};

/// Echo captured build output to `status`, one step per line.
///
/// Every line gets the style of the overall outcome: after a failed build even the
/// informational lines that preceded the failure are shown as errors. Returns the number of
/// lines emitted.
pub fn report_output(status: &mut dyn Status, output: &str, succeeded: bool) -> usize {
    let style = StepStyle::for_outcome(succeeded);
    let mut emitted = 0;
    for line in output.lines() {
        status.step(style, line);
        emitted += 1;
    }
    emitted
}
