pub mod outbox;

use crate::entities::work_order::WorkOrderStatus;
use crate::errors::ServiceError;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Domain events emitted after state changes commit.
///
/// Events are enqueued to the transactional outbox inside the same database
/// transaction as the write they describe, then dispatched to the in-process
/// channel by the outbox worker. Consumers must tolerate at-least-once
/// delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WorkOrderCreated {
        work_order_id: Uuid,
        order_number: String,
    },
    WorkOrderStatusChanged {
        work_order_id: Uuid,
        old_status: WorkOrderStatus,
        new_status: WorkOrderStatus,
    },
    MaterialRequested {
        work_order_id: Uuid,
        product_id: Uuid,
        warehouse_id: Uuid,
        quantity: i32,
    },
    MaterialDetached {
        work_order_id: Uuid,
        product_id: Uuid,
        warehouse_id: Uuid,
        quantity: i32,
    },
    ToolAssigned {
        assignment_id: Uuid,
        tool_id: Uuid,
        assigned_to: Uuid,
    },
    ToolReturnRequested {
        assignment_id: Uuid,
        tool_id: Uuid,
    },
    ToolReturnApproved {
        assignment_id: Uuid,
        tool_id: Uuid,
    },
    ToolReturnRejected {
        assignment_id: Uuid,
        tool_id: Uuid,
    },
    VehicleMaintenanceDue {
        vehicle_id: Uuid,
        due_date: chrono::NaiveDate,
    },
    VehicleInsuranceDue {
        vehicle_id: Uuid,
        expiry_date: chrono::NaiveDate,
    },
}

impl Event {
    /// Stable event-type discriminant used for the outbox `event_type` column
    /// and for metrics labels. Matches the serde tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::WorkOrderCreated { .. } => "work_order_created",
            Event::WorkOrderStatusChanged { .. } => "work_order_status_changed",
            Event::MaterialRequested { .. } => "material_requested",
            Event::MaterialDetached { .. } => "material_detached",
            Event::ToolAssigned { .. } => "tool_assigned",
            Event::ToolReturnRequested { .. } => "tool_return_requested",
            Event::ToolReturnApproved { .. } => "tool_return_approved",
            Event::ToolReturnRejected { .. } => "tool_return_rejected",
            Event::VehicleMaintenanceDue { .. } => "vehicle_maintenance_due",
            Event::VehicleInsuranceDue { .. } => "vehicle_insurance_due",
        }
    }

    /// The aggregate this event belongs to, as (type, id).
    pub fn aggregate(&self) -> (&'static str, Option<Uuid>) {
        match self {
            Event::WorkOrderCreated { work_order_id, .. }
            | Event::WorkOrderStatusChanged { work_order_id, .. }
            | Event::MaterialRequested { work_order_id, .. }
            | Event::MaterialDetached { work_order_id, .. } => ("work_order", Some(*work_order_id)),
            Event::ToolAssigned { assignment_id, .. }
            | Event::ToolReturnRequested { assignment_id, .. }
            | Event::ToolReturnApproved { assignment_id, .. }
            | Event::ToolReturnRejected { assignment_id, .. } => {
                ("tool_assignment", Some(*assignment_id))
            }
            Event::VehicleMaintenanceDue { vehicle_id, .. }
            | Event::VehicleInsuranceDue { vehicle_id, .. } => ("vehicle", Some(*vehicle_id)),
        }
    }
}

/// Cloneable handle for emitting events into the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        let event_type = event.event_type();
        self.sender.send(event).await.map_err(|e| {
            error!("Failed to send {} event: {}", event_type, e);
            ServiceError::EventError(format!("failed to send event: {}", e))
        })?;
        counter!("fieldops_events.sent", 1, "event_type" => event_type);
        Ok(())
    }
}

/// Create the event channel with a bounded buffer.
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Consume the event channel and log each event. This is the tail of the
/// pipeline; notification fan-out already happened synchronously in the
/// services, so the loop exists for observability and future consumers.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processing loop started");
    while let Some(event) = receiver.recv().await {
        counter!("fieldops_events.processed", 1, "event_type" => event.event_type());
        match &event {
            Event::WorkOrderCreated {
                work_order_id,
                order_number,
            } => {
                info!(%work_order_id, %order_number, "work order created");
            }
            Event::WorkOrderStatusChanged {
                work_order_id,
                old_status,
                new_status,
            } => {
                info!(
                    %work_order_id,
                    old = old_status.as_str(),
                    new = new_status.as_str(),
                    "work order status changed"
                );
            }
            Event::MaterialRequested {
                work_order_id,
                product_id,
                quantity,
                ..
            } => {
                info!(%work_order_id, %product_id, quantity, "material attached");
            }
            Event::MaterialDetached {
                work_order_id,
                product_id,
                quantity,
                ..
            } => {
                info!(%work_order_id, %product_id, quantity, "material detached");
            }
            Event::ToolAssigned {
                assignment_id,
                tool_id,
                assigned_to,
            } => {
                info!(%assignment_id, %tool_id, %assigned_to, "tool assigned");
            }
            Event::ToolReturnRequested { assignment_id, .. }
            | Event::ToolReturnApproved { assignment_id, .. }
            | Event::ToolReturnRejected { assignment_id, .. } => {
                debug!(%assignment_id, event_type = event.event_type(), "tool custody event");
            }
            Event::VehicleMaintenanceDue {
                vehicle_id,
                due_date,
            } => {
                info!(%vehicle_id, %due_date, "vehicle maintenance due");
            }
            Event::VehicleInsuranceDue {
                vehicle_id,
                expiry_date,
            } => {
                info!(%vehicle_id, %expiry_date, "vehicle insurance due");
            }
        }
    }
    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_matches_serde_tag() {
        let event = Event::WorkOrderCreated {
            work_order_id: Uuid::new_v4(),
            order_number: "WO-2026-000001".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }

    #[test]
    fn payload_round_trips() {
        let event = Event::WorkOrderStatusChanged {
            work_order_id: Uuid::new_v4(),
            old_status: WorkOrderStatus::Pending,
            new_status: WorkOrderStatus::InProgress,
        };
        let json = serde_json::to_value(&event).unwrap();
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (sender, mut receiver) = event_channel(8);
        let event = Event::ToolReturnRequested {
            assignment_id: Uuid::new_v4(),
            tool_id: Uuid::new_v4(),
        };
        sender.send(event.clone()).await.unwrap();
        assert_eq!(receiver.recv().await, Some(event));
    }
}
