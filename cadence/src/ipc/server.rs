//! Unix domain socket server for IPC

use crate::controller::Controller;
use anyhow::Result;
use cadence_ipc::{read_command, write_response, Command, Response};
use std::path::Path;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

pub async fn start(path: &Path, controller: Controller) -> Result<()> {
    // Remove old socket if it exists
    let _ = std::fs::remove_file(path);

    let listener = UnixListener::bind(path)?;
    info!("IPC server listening on {}", path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, controller).await {
                        error!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, controller: Controller) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let response = match read_command(&mut reader).await {
        Ok(command) => {
            debug!(?command, "IPC command");
            dispatch(&controller, command).await
        }
        Err(e) => Response::Error(e.to_string()),
    };

    write_response(&mut writer, &response).await?;
    Ok(())
}

pub async fn dispatch(controller: &Controller, command: Command) -> Response {
    let timer = controller.timer();
    match command {
        Command::Start => {
            timer.start().await;
            Response::Ok
        }
        Command::Pause => {
            timer.pause().await;
            Response::Ok
        }
        Command::Toggle => {
            timer.toggle().await;
            Response::Ok
        }
        Command::Stop => {
            timer.stop().await;
            Response::Ok
        }
        Command::Reset => {
            timer.reset_current().await;
            Response::Ok
        }
        Command::Skip => {
            timer.skip().await;
            Response::Ok
        }
        Command::Status => Response::Status(controller.status().await),
        Command::ListPresets => Response::Presets(controller.presets().await),
        Command::SelectPreset { id } => match controller.select_preset(&id).await {
            Ok(_) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::Configure(patch) if patch.is_empty() => {
            Response::Error("nothing to configure".to_string())
        }
        Command::Configure(patch) => match controller.configure(&patch).await {
            Ok(_) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::AddTask { title, project } => match controller.add_task(&title, project).await {
            Ok(_) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        },
        Command::ListTasks => Response::Tasks(controller.tasks().await),
        Command::NextTask => match controller.next_task().await {
            Some(_) => Response::Tasks(controller.tasks().await),
            None => Response::Error("task queue is empty".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimerConfig;
    use cadence_ipc::{DurationsPatch, SessionKind, TimerState};

    fn controller() -> Controller {
        Controller::new(&TimerConfig::default())
    }

    async fn status(controller: &Controller) -> cadence_ipc::TimerStatus {
        match dispatch(controller, Command::Status).await {
            Response::Status(status) => status,
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_pause_over_dispatch() {
        let controller = controller();
        assert!(matches!(dispatch(&controller, Command::Start).await, Response::Ok));
        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
        dispatch(&controller, Command::Pause).await;

        let status = status(&controller).await;
        assert_eq!(status.state, TimerState::Paused);
        assert_eq!(status.remaining, 1498);
        assert_eq!(status.total, 1500);
    }

    #[tokio::test]
    async fn test_skip_reports_next_phase() {
        let controller = controller();
        dispatch(&controller, Command::Skip).await;
        let status = status(&controller).await;
        assert_eq!(status.kind, SessionKind::ShortBreak);
        assert_eq!(status.next, SessionKind::Work);
        assert_eq!(status.completed_work_cycles, 0);
    }

    #[tokio::test]
    async fn test_unknown_preset_is_an_error() {
        let controller = controller();
        match dispatch(
            &controller,
            Command::SelectPreset {
                id: "marathon".to_string(),
            },
        )
        .await
        {
            Response::Error(msg) => assert!(msg.contains("marathon")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_configure_and_list_presets() {
        let controller = controller();
        assert!(matches!(
            dispatch(&controller, Command::Configure(DurationsPatch::default())).await,
            Response::Error(_)
        ));

        dispatch(
            &controller,
            Command::Configure(DurationsPatch {
                cycles_before_long_break: Some(2),
                ..Default::default()
            }),
        )
        .await;

        match dispatch(&controller, Command::ListPresets).await {
            Response::Presets(presets) => {
                let custom = presets.iter().find(|p| p.selected).unwrap();
                assert_eq!(custom.id, "custom");
                assert_eq!(custom.cycles_before_long_break, Some(2));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_two_phase_configure_rejects_cycles() {
        let controller = Controller::new(&TimerConfig {
            long_breaks: false,
            ..Default::default()
        });
        let response = dispatch(
            &controller,
            Command::Configure(DurationsPatch {
                cycles_before_long_break: Some(1),
                ..Default::default()
            }),
        )
        .await;
        assert!(matches!(response, Response::Error(_)));

        let status = status(&controller).await;
        assert_eq!(status.next, SessionKind::ShortBreak);
        assert_eq!(status.preset, "pomodoro");
    }

    #[tokio::test]
    async fn test_task_commands() {
        let controller = controller();
        assert!(matches!(
            dispatch(&controller, Command::NextTask).await,
            Response::Error(_)
        ));

        for title in ["Outline", "Draft"] {
            let response = dispatch(
                &controller,
                Command::AddTask {
                    title: title.to_string(),
                    project: None,
                },
            )
            .await;
            assert!(matches!(response, Response::Ok));
        }

        match dispatch(&controller, Command::NextTask).await {
            Response::Tasks(tasks) => {
                let active = tasks.iter().find(|t| t.active).unwrap();
                assert_eq!(active.title, "Draft");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        match dispatch(&controller, Command::ListTasks).await {
            Response::Tasks(tasks) => assert_eq!(tasks.len(), 2),
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
