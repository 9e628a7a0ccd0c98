use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::EnhancerFoot;

/// Public API for the enhancer backend - owns the task
pub struct EnhancerBackend
{   hand: crate::EnhancerHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl EnhancerBackend
{   /// Create and spawn a new backend around `flow`
    /// Returns immediately - spawns background task
    pub fn new(flow: crate::flow::PromptFlow) -> Self
    {   debug!("Creating EnhancerBackend with task ownership");

        let (submit_tx, submit_rx)
          = mpsc::unbounded_channel();
        let (set_api_key_tx, set_api_key_rx)
          = mpsc::unbounded_channel();
        let (get_model_list_tx, get_model_list_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::EnhancerHand
        {   submit_tx
          , set_api_key_tx
          , get_model_list_tx
          , kill_process_tx
        };

        let foot = crate::EnhancerFoot
        {   submit_rx
          , set_api_key_rx
          , get_model_list_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, flow).await
        });

        EnhancerBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a submission - returns almost immediately
    pub async fn submit(
      &self
    , request: crate::request::PromptRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SubmitReply>,
        crate::error::Error
      >
    {   debug!("submit queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SubmitArgs
        {   request
          , reply: reply_tx
        };

        self.hand.submit_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Replace the API key used for later submissions
    pub async fn set_api_key(
      &self
    , key: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SetApiKeyReply>,
        crate::error::Error
      >
    {   debug!("set_api_key queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SetApiKeyArgs
        {   key
          , reply: reply_tx
        };

        self.hand.set_api_key_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Get the selectable models - returns almost immediately
    pub async fn get_model_list(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GetModelListReply>,
        crate::error::Error
      >
    {   debug!("get_model_list queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GetModelListArgs
        {   reply: reply_tx
        };

        self.hand.get_model_list_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down EnhancerBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend dropped shutdown reply");
            Err(crate::error::Error::Other(
              "Backend exited before confirming shutdown".to_string()
            ))
        }
    }
}

/// Main backend event loop
///
/// Each arm runs its command to completion before the next `select!`,
/// so a submission's request and reply never overlap another's.
async fn run_backend_loop(
  foot: crate::EnhancerFoot
, mut flow: crate::flow::PromptFlow
)
{   debug!("Starting EnhancerBackend event loop");
    let EnhancerFoot
    {   mut submit_rx
      , mut set_api_key_rx
      , mut get_model_list_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = submit_rx.recv() => {
          debug!("Received Submit");
          let outcome = flow.submit(&cmd.request).await;
          let _ = cmd.reply.send(Ok(outcome));
        }
      , Some(cmd) = set_api_key_rx.recv() => {
          debug!("Received SetApiKey");
          let result = if cmd.key.trim().is_empty()
          {   Err(crate::error::Error::MissingApiKey)
          } else
          {   flow.set_api_key(cmd.key);
              Ok(())
          };
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = get_model_list_rx.recv() => {
          debug!("Received GetModelList");
          let _ = cmd.reply.send(Ok(crate::ChatModel::ALL.to_vec()));
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("EnhancerBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
