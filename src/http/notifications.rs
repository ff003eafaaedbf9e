use crate::services::NotificationLog;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use std::sync::Arc;

pub(crate) async fn get_notifications(
    notification_log: Data<Arc<NotificationLog>>,
) -> impl Responder {
    HttpResponse::Ok().json(notification_log.recent())
}
