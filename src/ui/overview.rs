use iced::alignment::Horizontal;
use iced::widget::{button, column, container, row, svg, text, Column};
use iced::{Alignment, Color, Element, Length};

use crate::models::DeviceInfo;
use crate::ui::messages::Message;
use crate::ui::LOGO_SVG;

pub fn view_overview<'a>(device: Option<&'a DeviceInfo>, probing: bool) -> Element<'a, Message> {
    // Create the logo widget from the included SVG data
    let logo = svg::Svg::new(svg::Handle::from_memory(LOGO_SVG))
        .width(140)
        .height(140);

    let title = text("SynCE CAB Manager")
        .size(38)
        .width(Length::Fill)
        .align_x(Horizontal::Center);

    let description = text("Install software packages onto a connected Windows Mobile handset.")
        .size(16)
        .width(Length::Fill)
        .align_x(Horizontal::Center);

    let install_button = button(container("Install Software...").center_x(Length::Fill))
        .width(250)
        .padding(14)
        .style(button::primary)
        .on_press(Message::OpenInstaller);

    let refresh_button = button(container("Refresh").center_x(Length::Fill))
        .width(250)
        .padding(14)
        .style(button::secondary)
        .on_press(Message::ProbeDevice);

    let quit_button = button(container("Quit").center_x(Length::Fill))
        .width(250)
        .padding(14)
        .style(button::secondary)
        .on_press(Message::Exit);

    // Add version and build time info
    let version_info = format!(
        "v{} • Built {}",
        crate::version::VERSION,
        crate::version::BUILD_TIME
    );
    let version_text = text(version_info).size(12);

    let mut content_items: Vec<Element<'a, Message>> = vec![
        logo.into(),
        title.into(),
        container(description).padding([0, 20]).into(),
        device_panel(device, probing),
    ];

    content_items.extend([
        container(iced::widget::row![]).height(Length::Fill).into(),
        install_button.into(),
        refresh_button.into(),
        quit_button.into(),
        container(column![]).height(Length::Fill).into(),
        version_text.into(),
    ]);

    let content = column(content_items)
        .width(Length::Fill)
        .spacing(15)
        .align_x(Alignment::Center)
        .padding(30);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(crate::style::main_box)
        .into()
}

fn device_panel<'a>(device: Option<&'a DeviceInfo>, probing: bool) -> Element<'a, Message> {
    let label_color = Color::from_rgb(0.6, 0.6, 0.6);

    let content: Column<'a, Message> = if probing {
        column![text("Looking for a connected device...").size(14)]
    } else {
        match device {
            Some(info) => {
                let mut lines: Vec<Element<'a, Message>> = vec![
                    row![
                        text("Device:").size(14).color(label_color),
                        text(&info.name).size(14),
                    ]
                    .spacing(8)
                    .into(),
                    row![
                        text("Address:").size(14).color(label_color),
                        text(&info.address).size(14),
                    ]
                    .spacing(8)
                    .into(),
                ];

                if let Some(model) = &info.model {
                    lines.push(
                        row![text("Model:").size(14).color(label_color), text(model).size(14)]
                            .spacing(8)
                            .into(),
                    );
                }
                if let Some(os) = &info.os {
                    lines.push(
                        row![text("System:").size(14).color(label_color), text(os).size(14)]
                            .spacing(8)
                            .into(),
                    );
                }
                if let Some(transport) = &info.transport {
                    lines.push(
                        row![
                            text("Transport:").size(14).color(label_color),
                            text(transport).size(14),
                        ]
                        .spacing(8)
                        .into(),
                    );
                }

                Column::with_children(lines).spacing(4)
            }
            None => column![
                text("No device connected").size(16),
                text("Connect a handset and press Refresh.").size(14),
            ]
            .spacing(5),
        }
    };

    container(content)
        .width(Length::Fill)
        .padding(15)
        .style(crate::style::bordered_box)
        .into()
}
