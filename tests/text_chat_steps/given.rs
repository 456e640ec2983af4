//! Given steps for text chat BDD scenarios.

use super::world::{ChatWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use text_chat_store::chat::{
    domain::NewConversation,
    ports::{EntityKind, TextChatStore},
};

#[given(r#"the user directory knows "{first}", "{second}" and "{third}""#)]
fn user_directory_knows(
    world: &mut ChatWorld,
    first: String,
    second: String,
    third: String,
) -> Result<(), eyre::Report> {
    for user in [first, second, third] {
        world
            .directory
            .register(EntityKind::User, user)
            .wrap_err("register user")?;
    }
    Ok(())
}

#[given(r#"the game directory knows "{game}""#)]
fn game_directory_knows(world: &mut ChatWorld, game: String) -> Result<(), eyre::Report> {
    world
        .directory
        .register(EntityKind::Game, game)
        .wrap_err("register game")
}

#[given(r#"a conversation between "{first}" and "{second}" for game "{game}""#)]
fn existing_conversation(
    world: &mut ChatWorld,
    first: String,
    second: String,
    game: String,
) -> Result<(), eyre::Report> {
    let request = NewConversation::new([first, second], game).wrap_err("build conversation")?;
    let created = run_async(world.store.add_conversation(&world.ctx, request))
        .wrap_err("create conversation for scenario")?;
    world.conversation = Some(created);
    Ok(())
}

#[given("the user directory is unreachable")]
fn user_directory_unreachable(world: &mut ChatWorld) -> Result<(), eyre::Report> {
    world
        .directory
        .set_unreachable(EntityKind::User, true)
        .wrap_err("simulate user directory outage")
}
