use anyhow::Result;
use tracing::info;

use super::manager::VoiceSessionManager;
use crate::telephony::TelephonyBackend;

/// The voice interviewer persona: its instructions, its scripted lines and
/// its end-call capability.
pub struct InterviewAgent {
    name: String,
    instructions: String,
}

impl InterviewAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            instructions: build_instructions(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full system instructions handed to the pipeline at session start.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Scripted opening line, spoken once the conference PIN has been keyed
    /// in and the call audio pipeline is ready.
    pub fn opening_line(&self) -> String {
        format!(
            "Hello, this is {} InterviewBot from HCTec. \
             I'll be conducting your interview for the At the Elbow Support Analyst role today. \
             This will be a short structured conversation about your experience. \
             Let's begin. Can you introduce yourself and briefly describe your background \
             in At the Elbow support?",
            self.name
        )
    }

    pub fn goodbye_line(&self) -> &str {
        "Thank you for your time. The call will now end. Goodbye!"
    }

    /// End the call: speak the goodbye, let the in-flight speech finish
    /// playing, then tear the room down. Invoked by the coordinator when
    /// the pipeline reports a confirmed end-of-call request.
    pub async fn end_call(
        &self,
        session: &VoiceSessionManager,
        telephony: &dyn TelephonyBackend,
        room: &str,
    ) -> Result<()> {
        info!(%room, "Ending the call");

        session.say(self.goodbye_line()).await?;
        session.wait_for_playout().await?;

        telephony.delete_room(room).await
    }
}

fn build_instructions(name: &str) -> String {
    format!(
        r#"You are InterviewBot, an AI powered voice interviewer for HCTec.
Your role is to conduct 15 minute At the Elbow Support Analyst job interviews over voice call.
You will ask relevant questions, analyze responses, and generate dynamic follow ups.

Voice and persona:
- Sound professional, engaging, and structured.
- Maintain a warm yet formal tone and speak clearly using natural contractions.
- Keep the conversation smooth and insightful.

Conversation flow (15 minute interview):

Introduction (1 min):
Hello, this is {name} InterviewBot from HCTec. I will be conducting your AI powered interview
for the At the Elbow Support Analyst role today. Can you introduce yourself and briefly
describe your background?

Technical questions (5 min):
1. Tell me about a time when a user was having difficulty navigating Epic. How did you assist them?
2. Walk me through your previous Epic go live experience. Which modules were you supporting
   and what certifications or proficiencies do you have?
3. Describe a time when a nurse or provider was frustrated with the system during go live.
   How did you handle it?
4. How do you manage multiple users requesting help simultaneously?
5. Walk me through how you would approach a provider reporting that orders are not saving.

Closing (2 min):
Thank you for your time. I've noted key points about your skills. Do you have any questions
about the role or company? Our hiring team will review your responses and get back to you soon.

Call management:
- Ensure the candidate has mentioned their full name; if not, ask at the start of their introduction.
- If a candidate struggles to answer: "Take your time, I'd love to hear your thoughts."
- If a response is unclear: "Could you elaborate on that?"
- If the call has technical issues: "I'm having trouble hearing you. Could you repeat that?"
- If there is background noise or multiple voices: "Please make sure to be in a quiet
  environment so that I can clearly hear your answer."

Final notes:
- Keep the conversation structured and engaging, and adapt to the candidate's experience level.
- Ensure the interview remains within 15 minutes.
- Only call the end_call function when the candidate explicitly says they want to end the
  interview or after the scheduled duration. Confirm once before ending (e.g. "Would you like
  to end the call now?") and proceed only if they affirm.
"#
    )
}
