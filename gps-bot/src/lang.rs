//! User-facing Russian strings.

// Button labels
pub const BUTTON_CHECK_STATUS: &str = "📍 Проверить статус";
pub const BUTTON_UPDATE_LOCATION: &str = "🔄 Обновить местоположение";

// Command descriptions
pub const CMD_START: &str = "Запустить бота";
pub const CMD_HELP: &str = "Показать справку";

pub const WELCOME_MESSAGE: &str =
    "👋 Добро пожаловать в GPS трекер!\n\nИспользуйте кнопки ниже для управления:";

pub const HELP_MESSAGE: &str = "📖 **Справка по командам**

• /start - Запустить бота и показать меню
• /help - Показать это сообщение

Используйте кнопки в меню для:
• 📍 Проверить статус - получить текущие данные о местоположении
• 🔄 Обновить местоположение - запросить обновление GPS данных";

// Location update flow
pub const PROCESSING_UPDATE: &str = "🔄 Отправка запроса на обновление местоположения...";
pub const UPDATE_SUCCESS: &str = "✅ Запрос на обновление местоположения отправлен успешно!

Нажмите кнопку «Проверить статус» через несколько секунд, чтобы увидеть обновленную информацию.";
pub const UPDATE_FAILED: &str =
    "❌ Не удалось отправить запрос на обновление.\nПожалуйста, попробуйте еще раз позже.";
pub const UPDATE_ERROR: &str = "❌ Произошла ошибка при отправке запроса на обновление.";

// Status check flow
pub const GETTING_STATUS: &str = "🔄 Получение текущих данных...";
pub const STATUS_FAILED: &str = "❌ Не удалось получить данные. Попробуйте позже.";
pub const STATUS_ERROR: &str = "❌ Произошла ошибка при получении статуса.";

// Vehicle status strings
pub const STATUS_UNKNOWN: &str = "Неизвестно";

pub fn status_static(minutes: u32) -> String {
    format!("Автомобиль стоит на месте {minutes} минут")
}

/// The full status card shown after a successful fetch.
pub fn status_message(
    name: &str,
    update_time: &str,
    travel_time: &str,
    status: &str,
    speed: u32,
    battery: u8,
) -> String {
    format!(
        "🚗 **{name}**\n\n\
         📍 **Местоположение**\n\
         - Последнее обновление: {update_time}\n\
         - Время до дома: {travel_time}\n\n\
         📊 **Состояние**\n\
         - Статус: {status}\n\
         - Скорость: {speed} км/ч\n\
         - Заряд батареи: {battery}%"
    )
}

// Time units (nominative / paucal / genitive plural)
pub const MINUTE_1: &str = "минута";
pub const MINUTE_2_4: &str = "минуты";
pub const MINUTE_5_20: &str = "минут";
pub const HOUR_1: &str = "час";
pub const HOUR_2_4: &str = "часа";
pub const HOUR_5_20: &str = "часов";
