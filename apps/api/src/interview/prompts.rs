// Interviewer lines appended to the session conversation.

pub const CLOSING_MESSAGE: &str = "Thank you for your answers. The interview is now over. \
    I will now evaluate your performance.";

pub const EVALUATION_READY_MESSAGE: &str = "Your evaluation is ready. You can now review your results.";

pub fn greeting(job_title: &str) -> String {
    format!(
        "Hello and welcome to this interview for the {job_title} position. \
         I will ask you a few questions to assess your skills and your fit for the role. Let's begin."
    )
}
