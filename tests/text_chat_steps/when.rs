//! When steps for text chat BDD scenarios.

use super::world::{ChatWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use text_chat_store::chat::{
    domain::{MembershipUpdate, NewConversation, NewMessage},
    ports::TextChatStore,
};

#[when(r#""{author}" says "{text}""#)]
fn author_says(world: &mut ChatWorld, author: String, text: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id().clone();
    let message =
        NewMessage::new(author, conversation_id.into_inner(), text).wrap_err("build message")?;
    let result = run_async(world.store.add_message(&world.ctx, message));
    world.last_write = Some(result.map(|_| ()));
    Ok(())
}

#[when("the conversation is deleted")]
fn conversation_deleted(world: &mut ChatWorld) -> Result<(), eyre::Report> {
    let id = world.conversation()?.id().clone();
    run_async(world.store.delete_conversation(&world.ctx, &id)).wrap_err("delete conversation")
}

#[when(r#"a conversation between "{first}" and "{second}" for game "{game}" is requested"#)]
fn conversation_requested(
    world: &mut ChatWorld,
    first: String,
    second: String,
    game: String,
) -> Result<(), eyre::Report> {
    let request = NewConversation::new([first, second], game).wrap_err("build conversation")?;
    match run_async(world.store.add_conversation(&world.ctx, request)) {
        Ok(created) => {
            world.conversation = Some(created);
            world.last_write = Some(Ok(()));
        }
        Err(err) => world.last_write = Some(Err(err)),
    }
    Ok(())
}

#[when(r#"the members are replaced by "{member}" for game "{game}""#)]
fn members_replaced(
    world: &mut ChatWorld,
    member: String,
    game: String,
) -> Result<(), eyre::Report> {
    let id = world.conversation()?.id().clone();
    let update =
        MembershipUpdate::new(id.into_inner(), [member], game).wrap_err("build membership")?;
    let updated = run_async(world.store.add_user_to_conversation(&world.ctx, update))
        .wrap_err("replace membership")?;
    world.conversation = Some(updated);
    Ok(())
}
