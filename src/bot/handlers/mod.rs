pub mod message;
pub mod poll_answer;
pub mod wizard;

use teloxide::dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler};
use teloxide::prelude::*;

use crate::bot::commands::Command;
use wizard::CreatePollState;

/// Common result type for dispatch-tree endpoints.
pub type HandlerResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// The full dptree update tree. Poll answers branch off first: they carry
/// no chat id, so they must not pass through `dialogue::enter`. Inside the
/// dialogue subtree commands come before wizard states so /cancel works
/// mid-wizard.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(Update::filter_poll_answer().endpoint(poll_answer::poll_answer_handler))
        .branch(
            dialogue::enter::<Update, InMemStorage<CreatePollState>, CreatePollState, _>()
                .branch(
                    Update::filter_message()
                        .filter_command::<Command>()
                        .endpoint(message::command_handler),
                )
                .branch(
                    Update::filter_message()
                        .branch(
                            dptree::case![CreatePollState::ReceiveQuestion]
                                .endpoint(wizard::receive_question),
                        )
                        .branch(
                            dptree::case![CreatePollState::ReceiveOptions { question }]
                                .endpoint(wizard::receive_options),
                        )
                        .branch(
                            dptree::case![CreatePollState::ReceiveSchedule { question, options }]
                                .endpoint(wizard::receive_schedule),
                        )
                        .branch(
                            dptree::case![CreatePollState::ReceivePinned {
                                question,
                                options,
                                schedule
                            }]
                            .endpoint(wizard::receive_pinned),
                        )
                        .branch(
                            dptree::case![CreatePollState::ReceiveDeletePrevious {
                                question,
                                options,
                                schedule,
                                pinned
                            }]
                            .endpoint(wizard::receive_delete_previous),
                        ),
                )
                .branch(Update::filter_message().endpoint(message::fallback_handler)),
        )
}
