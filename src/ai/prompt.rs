use crate::models::{Profile, User};

use super::generator::Outreach;

pub(crate) fn outreach(sender: &User, sender_profile: Option<&Profile>, receiver: &User, receiver_profile: Option<&Profile>) -> Outreach {
    let interests = |profile: Option<&Profile>| -> Vec<String> {
        profile
            .map(|profile| profile.interests.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    };
    let sender_interests = interests(sender_profile);
    let receiver_interests = interests(receiver_profile);

    let shared_interest = receiver_interests
        .iter()
        .find(|interest| sender_interests.contains(interest))
        .or(receiver_interests.first())
        .cloned();

    let about = receiver_profile
        .map(|profile| profile.about.trim())
        .filter(|about| !about.is_empty())
        .unwrap_or("(no bio)");

    let prompt = format!(
        "Write a short, warm and respectful first message on a dating site.\n\
         The sender is {sender_name}.\n\
         The recipient is {receiver_name}, based in {location}.\n\
         Their interests: {interests}.\n\
         Their bio: {about}\n\
         Keep it under 60 words, mention one of their interests, and end with a question. \
         Reply with the message text only.",
        sender_name = sender.name,
        receiver_name = receiver.name,
        location = receiver.location.as_deref().unwrap_or("an undisclosed location"),
        interests = if receiver_interests.is_empty() { "not listed".to_owned() } else { receiver_interests.join(", ") },
    );

    Outreach {
        prompt,
        receiver_name: receiver.name.clone(),
        shared_interest,
    }
}
