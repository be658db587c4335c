mod composer;

pub use composer::{
    StoryLength, StoryMetadata, feedback_prompt, feedback_system_prompt, system_prompt,
    user_prompt,
};
